//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, chain ids numeric where required)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TxConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::{NetworkConfig, TxConfig};
use crate::rpc::parse_endpoint;
use crate::types::Framework;

/// One semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate the whole config.
pub fn validate_config(config: &TxConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_network(&config.network);
    if config.timeouts.call_secs == 0 {
        errors.push(ValidationError::new("timeouts.call_secs", "must be greater than zero"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one network section; an empty list means it is usable.
pub fn validate_network(network: &NetworkConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if network.rpc_endpoint.trim().is_empty() {
        errors.push(ValidationError::new("network.rpc_endpoint", "is required"));
    } else if let Err(e) = parse_endpoint(&network.rpc_endpoint) {
        errors.push(ValidationError::new("network.rpc_endpoint", e.to_string()));
    }

    if let Some(rest) = &network.rest_endpoint {
        if let Err(e) = parse_endpoint(rest) {
            errors.push(ValidationError::new("network.rest_endpoint", e.to_string()));
        }
    }

    if network.chain_id.trim().is_empty() {
        errors.push(ValidationError::new("network.chain_id", "is required"));
    } else if network.framework == Framework::Evm && network.chain_id.parse::<u64>().is_err() {
        errors.push(ValidationError::new(
            "network.chain_id",
            format!("EVM chain id must be a decimal integer, got {:?}", network.chain_id),
        ));
    }

    if network.framework == Framework::Cosmos && network.address_prefix.trim().is_empty() {
        errors.push(ValidationError::new("network.address_prefix", "is required"));
    }

    if network.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "network.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    errors
}
