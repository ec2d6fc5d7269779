//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Open store → Register keys → Build resolver → Start admin API
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop admin API → Abandon live resolutions → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Registration runs before any caller can resolve
//! - Retry loops are abandoned, not drained: they may never finish

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, bootstrap_with_store, Services, StartupError};
