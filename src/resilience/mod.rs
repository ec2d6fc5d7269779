//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver::get_value
//!     → engine.rs (start or reuse a retry loop for the key)
//!     → task.rs (observable state: Running → Succeeded | Failed)
//!     → backoff.rs (delay between unsuccessful attempts)
//! ```
//!
//! # Design Decisions
//! - Loops are tokio tasks, not threads; they mostly sleep
//! - Callers observe tasks through a watch channel, never by polling
//! - Only cancellation and shutdown end a loop without a value

pub mod backoff;
pub mod engine;
pub mod task;

pub use backoff::BackoffPolicy;
pub use engine::RetryEngine;
pub use task::{Attachment, FailureKind, ResolutionTask, ResolveError, TaskSnapshot, TaskState};
