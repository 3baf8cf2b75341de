//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → TxConfig (validated, immutable)
//!     → NetworkConfig handed to connect_builder
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Address prefixes live in each network's config, never in process-wide state

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{NetworkConfig, ObservabilityConfig, TimeoutConfig, TxConfig};
pub use validation::{validate_config, validate_network, ValidationError};
