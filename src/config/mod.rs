//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! resolver.toml
//!     → loader.rs (read & deserialize, missing file → defaults)
//!     → validation.rs (semantic checks)
//!     → ResolverConfig (validated, immutable)
//!     → lifecycle/startup.rs builds the store, engine and resolver from it
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The well-known key list is configuration, not a hidden global

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_or_default, parse_config, ConfigError};
pub use schema::{
    AdminConfig, LogFormat, ObservabilityConfig, ResolutionConfig, ResolverConfig, StoreBackend,
    StoreConfig,
};
