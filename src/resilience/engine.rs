//! Indefinite retry loop for configuration values.
//!
//! # Responsibilities
//! - Poll a fetch function until it yields a non-empty value
//! - Pace attempts with the backoff policy
//! - Keep a registry of live tasks (by id, and by key in shared mode)
//! - Abandon every live loop at shutdown
//!
//! # Design Decisions
//! - No attempt limit: the loop ends on success, cancel or shutdown only
//! - A fetch fault is logged and retried exactly like an empty value
//! - Cancellation is observed at the backoff suspension point

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio::time;
use uuid::Uuid;

use crate::observability::metrics;
use crate::resilience::backoff::BackoffPolicy;
use crate::resilience::task::{FailureKind, ResolutionTask};

/// Spawns and tracks resolution tasks.
///
/// Cheap to clone; clones share the same registries.
#[derive(Clone, Default)]
pub struct RetryEngine {
    policy: BackoffPolicy,
    live: Arc<DashMap<Uuid, ResolutionTask>>,
    by_key: Arc<DashMap<String, ResolutionTask>>,
}

impl RetryEngine {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            live: Arc::new(DashMap::new()),
            by_key: Arc::new(DashMap::new()),
        }
    }

    pub fn policy(&self) -> BackoffPolicy {
        self.policy
    }

    /// Start a fresh, independent loop for `key`.
    pub fn resolve<F, E>(&self, key: &str, fetch: F) -> ResolutionTask
    where
        F: Fn() -> Result<Option<String>, E> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.spawn(key, fetch)
    }

    /// Reuse the running loop for `key`, or start and register one.
    ///
    /// `fetch` is dropped unused when an existing loop is reused.
    pub fn resolve_shared<F, E>(&self, key: &str, fetch: F) -> ResolutionTask
    where
        F: Fn() -> Result<Option<String>, E> + Send + 'static,
        E: Display + Send + 'static,
    {
        match self.by_key.entry(key.to_string()) {
            Entry::Occupied(existing) if existing.get().is_running() => {
                let task = existing.get().clone();
                tracing::debug!(key = %key, task_id = %task.id(), "Reusing in-flight resolution");
                task
            }
            entry => {
                let task = self.spawn(key, fetch);
                entry.insert(task.clone());
                task
            }
        }
    }

    /// Live (running) tasks.
    pub fn tasks(&self) -> Vec<ResolutionTask> {
        self.live.iter().map(|r| r.value().clone()).collect()
    }

    pub fn task(&self, id: Uuid) -> Option<ResolutionTask> {
        self.live.get(&id).map(|r| r.value().clone())
    }

    pub fn in_flight(&self) -> usize {
        self.live.len()
    }

    /// Stop every live loop without waiting for a terminal state.
    pub fn abandon_all(&self) -> usize {
        let tasks = self.tasks();
        for task in &tasks {
            task.abandon();
        }
        self.live.clear();
        self.by_key.clear();
        metrics::set_tasks_in_flight(0);

        if !tasks.is_empty() {
            tracing::info!(count = tasks.len(), "Abandoned in-flight resolutions");
        }
        tasks.len()
    }

    fn spawn<F, E>(&self, key: &str, fetch: F) -> ResolutionTask
    where
        F: Fn() -> Result<Option<String>, E> + Send + 'static,
        E: Display + Send + 'static,
    {
        let task = ResolutionTask::new(key);
        // Registered before spawning so a fast loop cannot unregister first.
        self.live.insert(task.id(), task.clone());
        metrics::set_tasks_in_flight(self.live.len());

        let run = RetryLoop {
            task: task.clone(),
            policy: self.policy,
            live: Arc::clone(&self.live),
            by_key: Arc::clone(&self.by_key),
        };
        let handle = tokio::spawn(run.drive(fetch));
        task.set_abort_handle(handle.abort_handle());

        tracing::debug!(key = %key, task_id = %task.id(), "Started resolution");
        task
    }
}

struct RetryLoop {
    task: ResolutionTask,
    policy: BackoffPolicy,
    live: Arc<DashMap<Uuid, ResolutionTask>>,
    by_key: Arc<DashMap<String, ResolutionTask>>,
}

impl RetryLoop {
    async fn drive<F, E>(self, fetch: F)
    where
        F: Fn() -> Result<Option<String>, E>,
        E: Display,
    {
        let key = self.task.key().to_string();
        let mut cancel = self.task.cancel_receiver();
        let mut attempt: u32 = 1;

        loop {
            // Abandoned before the abort handle was stored.
            if !self.task.is_running() {
                break;
            }
            self.task.begin_attempt(attempt);
            let delay = self.policy.delay();

            match fetch() {
                Ok(Some(value)) if !value.is_empty() => {
                    metrics::record_fetch_attempt("resolved");
                    metrics::record_task_attempts(attempt);
                    self.task.succeed(value, attempt);
                    tracing::info!(key = %key, attempts = attempt, "Configuration value resolved");
                    break;
                }
                Ok(_) => {
                    metrics::record_fetch_attempt("unresolved");
                    tracing::error!(
                        key = %key,
                        attempt,
                        retry_in_secs = delay.as_secs(),
                        "Configuration value not available"
                    );
                }
                Err(e) => {
                    metrics::record_fetch_attempt("fault");
                    tracing::error!(
                        key = %key,
                        attempt,
                        error = %e,
                        retry_in_secs = delay.as_secs(),
                        "Failed to fetch configuration value"
                    );
                }
            }

            tokio::select! {
                _ = time::sleep(delay) => {}
                Ok(_) = cancel.wait_for(|cancelled| *cancelled) => {
                    self.task.fail(FailureKind::Cancelled);
                    tracing::warn!(key = %key, attempt, "Resolution cancelled during backoff");
                    break;
                }
            }

            attempt = attempt.saturating_add(1);
        }

        self.finish();
    }

    fn finish(&self) {
        let id = self.task.id();
        self.live.remove(&id);
        self.by_key.remove_if(self.task.key(), |_, t| t.id() == id);
        metrics::set_tasks_in_flight(self.live.len());
    }
}
