//! Shutdown coordination.

use tokio::sync::broadcast;

use crate::resilience::RetryEngine;

/// Coordinator for graceful shutdown.
///
/// Long-running tasks (the admin server) subscribe to the broadcast; retry
/// loops are not drained but abandoned through the engine.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify subscribers and abandon every live resolution.
    pub fn trigger(&self, engine: &RetryEngine) {
        let _ = self.tx.send(());
        let abandoned = engine.abandon_all();
        tracing::info!(abandoned, "Shutdown triggered");
    }

    /// Number of tasks still listening for the signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::{BackoffPolicy, ResolveError};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_trigger_notifies_and_abandons() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 1);

        let engine = RetryEngine::new(BackoffPolicy::fixed(Duration::from_secs(300)));
        let task = engine.resolve("bot.token", || Ok::<_, String>(None));

        shutdown.trigger(&engine);
        assert!(rx.recv().await.is_ok());
        assert!(matches!(task.wait().await, Err(ResolveError::Abandoned { .. })));
        assert_eq!(engine.in_flight(), 0);
    }
}
