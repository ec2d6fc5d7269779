//! Bounded-wait configuration resolver library.

pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod resolver;
pub mod store;

pub use config::schema::ResolverConfig;
pub use lifecycle::Shutdown;
pub use resilience::{ResolutionTask, ResolveError, RetryEngine};
pub use resolver::Resolver;
pub use store::{ConfigEntry, Store};
