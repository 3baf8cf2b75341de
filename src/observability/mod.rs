//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! builders, resolvers, broadcasters produce:
//!     → tracing events (structured fields, never key material)
//!     → metrics.rs (build/broadcast counters, RPC latency)
//!
//! The binary installs:
//!     → logging.rs (EnvFilter + fmt or JSON subscriber)
//! ```
//!
//! # Design Decisions
//! - The library only emits; it never installs a subscriber or exporter
//! - Metric names are prefixed `txkit_`

pub mod logging;
pub mod metrics;
