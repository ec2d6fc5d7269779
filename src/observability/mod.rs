//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience/engine.rs, resolver.rs, admin/
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every log line about a key carries it as a structured field
//! - Metrics are cheap (atomic increments) and off by default

pub mod logging;
pub mod metrics;
