//! Bounded-wait configuration resolver.
//!
//! # Responsibilities
//! - Start or reuse a retry loop for the requested key
//! - Wait for it for at most the resolution budget
//! - Fall back to the empty placeholder while the loop continues unattended
//! - Surface cancellation and shutdown as errors, never a plain miss

use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use crate::config::ResolutionConfig;
use crate::observability::metrics;
use crate::resilience::{ResolutionTask, ResolveError, RetryEngine};
use crate::store::Store;

/// Public facade over the store and the retry engine.
pub struct Resolver {
    store: Arc<dyn Store>,
    engine: RetryEngine,
    budget: Duration,
    share_tasks: bool,
}

impl Resolver {
    pub const DEFAULT_BUDGET: Duration = Duration::from_secs(30);

    /// Resolver with the default budget and a shared task per key.
    pub fn new(store: Arc<dyn Store>, engine: RetryEngine) -> Self {
        Self {
            store,
            engine,
            budget: Self::DEFAULT_BUDGET,
            share_tasks: true,
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &ResolutionConfig) -> Self {
        Self::new(store, RetryEngine::new(config.backoff_policy()))
            .with_budget(config.budget())
            .with_shared_tasks(config.share_tasks)
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// When false, every call starts its own independent loop.
    pub fn with_shared_tasks(mut self, share: bool) -> Self {
        self.share_tasks = share;
        self
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn engine(&self) -> &RetryEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Resolve `key`, waiting at most the budget.
    ///
    /// Returns `""` when the budget elapses first; the retry loop keeps
    /// running and later calls see the value once it appears.
    pub async fn get_value(&self, key: &str) -> Result<String, ResolveError> {
        let task = self.start(key);
        let attachment = task.attach();

        match time::timeout(self.budget, attachment.wait()).await {
            Ok(Ok(value)) => {
                metrics::record_resolution("resolved");
                Ok(value)
            }
            Ok(Err(e)) => {
                metrics::record_resolution("failed");
                tracing::error!(key = %key, task_id = %task.id(), error = %e, "Configuration resolution failed");
                Err(e)
            }
            Err(_) => {
                metrics::record_resolution("deferred");
                tracing::warn!(
                    key = %key,
                    task_id = %task.id(),
                    budget_secs = self.budget.as_secs(),
                    "Configuration value not available yet, resolution continues in background"
                );
                Ok(String::new())
            }
        }
    }

    fn start(&self, key: &str) -> ResolutionTask {
        let store = Arc::clone(&self.store);
        let owned_key = key.to_string();
        let fetch = move || store.get(&owned_key);

        if self.share_tasks {
            self.engine.resolve_shared(key, fetch)
        } else {
            self.engine.resolve(key, fetch)
        }
    }
}
