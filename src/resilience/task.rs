//! Resolution task handle and state machine.
//!
//! # States
//! - Running: the retry loop is fetching or sleeping between attempts
//! - Succeeded: a non-empty value was observed; the result never changes again
//! - Failed: the loop was cancelled or abandoned; the failure reaches every waiter
//!
//! # State Transitions
//! ```text
//! Running → Succeeded: fetch returned a non-empty value
//! Running → Failed:    cancel() during backoff, or abandon() at shutdown
//! ```
//!
//! State lives in a `watch` channel so readers always see a whole snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use uuid::Uuid;

/// Lifecycle state of a resolution task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Running,
    Succeeded,
    Failed,
}

/// Why a task ended in [`TaskState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The backoff sleep was interrupted by `cancel()`.
    Cancelled,
    /// The loop was torn down at shutdown.
    Abandoned,
}

/// Fatal resolution failures surfaced to callers.
///
/// Empty values and fetch faults never produce one of these; they are
/// retried inside the loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("resolution of '{key}' was cancelled")]
    Cancelled { key: String },

    #[error("resolution of '{key}' was abandoned")]
    Abandoned { key: String },
}

impl ResolveError {
    pub fn key(&self) -> &str {
        match self {
            ResolveError::Cancelled { key } | ResolveError::Abandoned { key } => key,
        }
    }
}

/// Point-in-time view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSnapshot {
    pub attempt_count: u32,
    pub state: TaskState,
    pub result: Option<String>,
    pub failure: Option<FailureKind>,
}

impl TaskSnapshot {
    fn running() -> Self {
        Self {
            attempt_count: 1,
            state: TaskState::Running,
            result: None,
            failure: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state != TaskState::Running
    }

    /// The caller-visible outcome, or `None` while still running.
    fn outcome(&self, key: &str) -> Option<Result<String, ResolveError>> {
        match self.state {
            TaskState::Running => None,
            TaskState::Succeeded => Some(Ok(self.result.clone().unwrap_or_default())),
            TaskState::Failed => {
                let key = key.to_string();
                Some(Err(match self.failure {
                    Some(FailureKind::Cancelled) => ResolveError::Cancelled { key },
                    _ => ResolveError::Abandoned { key },
                }))
            }
        }
    }
}

struct Shared {
    id: Uuid,
    key: String,
    state: watch::Sender<TaskSnapshot>,
    cancel: watch::Sender<bool>,
    attached: AtomicUsize,
    abort: OnceLock<AbortHandle>,
}

/// Cloneable handle to one in-flight resolution.
///
/// Every clone refers to the same task. Dropping handles never stops the
/// loop; only [`ResolutionTask::cancel`] or shutdown does.
#[derive(Clone)]
pub struct ResolutionTask {
    shared: Arc<Shared>,
}

impl ResolutionTask {
    pub(crate) fn new(key: &str) -> Self {
        let (state, _) = watch::channel(TaskSnapshot::running());
        let (cancel, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                id: Uuid::new_v4(),
                key: key.to_string(),
                state,
                cancel,
                attached: AtomicUsize::new(0),
                abort: OnceLock::new(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.shared.state.borrow().is_terminal()
    }

    /// Number of callers currently waiting through an [`Attachment`].
    pub fn attached(&self) -> usize {
        self.shared.attached.load(Ordering::Relaxed)
    }

    /// Request cancellation. Takes effect at the next backoff suspension.
    ///
    /// Returns false if the task had already finished. A true result only
    /// means the request was recorded: a fetch already in progress that
    /// returns a value still ends the task in Succeeded.
    pub fn cancel(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.shared.cancel.send_replace(true);
        tracing::debug!(key = %self.key(), task_id = %self.id(), "Cancellation requested");
        true
    }

    /// Join the set of callers waiting on this task.
    pub fn attach(&self) -> Attachment {
        self.shared.attached.fetch_add(1, Ordering::Relaxed);
        Attachment { task: self.clone() }
    }

    /// Wait for a terminal state.
    pub async fn wait(&self) -> Result<String, ResolveError> {
        let mut rx = self.shared.state.subscribe();
        let outcome = match rx.wait_for(TaskSnapshot::is_terminal).await {
            Ok(snapshot) => snapshot.outcome(self.key()),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| {
            Err(ResolveError::Abandoned {
                key: self.key().to_string(),
            })
        })
    }

    pub(crate) fn cancel_receiver(&self) -> watch::Receiver<bool> {
        self.shared.cancel.subscribe()
    }

    pub(crate) fn begin_attempt(&self, attempt: u32) {
        self.shared.state.send_if_modified(|s| {
            if s.is_terminal() || s.attempt_count == attempt {
                return false;
            }
            s.attempt_count = attempt;
            true
        });
    }

    pub(crate) fn succeed(&self, value: String, attempts: u32) -> bool {
        self.shared.state.send_if_modified(|s| {
            if s.is_terminal() {
                return false;
            }
            s.attempt_count = attempts;
            s.state = TaskState::Succeeded;
            s.result = Some(value);
            true
        })
    }

    pub(crate) fn fail(&self, kind: FailureKind) -> bool {
        self.shared.state.send_if_modified(|s| {
            if s.is_terminal() {
                return false;
            }
            s.state = TaskState::Failed;
            s.failure = Some(kind);
            true
        })
    }

    pub(crate) fn set_abort_handle(&self, handle: AbortHandle) {
        let _ = self.shared.abort.set(handle);
    }

    /// Tear down the loop without waiting for it. Waiters see `Abandoned`.
    pub(crate) fn abandon(&self) {
        if self.fail(FailureKind::Abandoned) {
            tracing::debug!(key = %self.key(), task_id = %self.id(), "Resolution abandoned");
        }
        if let Some(handle) = self.shared.abort.get() {
            handle.abort();
        }
    }
}

impl fmt::Debug for ResolutionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionTask")
            .field("id", &self.id())
            .field("key", &self.key())
            .field("snapshot", &self.snapshot())
            .field("attached", &self.attached())
            .finish()
    }
}

/// A caller attached to a task. Detaches on drop.
pub struct Attachment {
    task: ResolutionTask,
}

impl Attachment {
    pub fn task(&self) -> &ResolutionTask {
        &self.task
    }

    pub async fn wait(&self) -> Result<String, ResolveError> {
        self.task.wait().await
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.task.shared.attached.fetch_sub(1, Ordering::Relaxed);
    }
}
