//! Error taxonomy shared by every transaction builder.
//!
//! Application-level rejections (a broadcast answered with a nonzero code)
//! are not errors; they come back as a populated
//! [`TxBroadcastResult`](crate::types::TxBroadcastResult).

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while building, signing or broadcasting a transaction.
#[derive(Debug, Error)]
pub enum TxError {
    /// Builder construction was given an unusable endpoint, chain id or version hint.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A payload or request field is malformed.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The signer account does not exist on-chain.
    #[error("account {address} not found")]
    NotFound { address: String },

    /// The builder does not advertise this transaction type.
    #[error("unsupported tx type: {0}")]
    UnsupportedTxType(String),

    /// Connection failure or malformed HTTP exchange.
    #[error("transport error: {0}")]
    Transport(String),

    /// The call exceeded its deadline.
    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    /// The caller cancelled the call.
    #[error("{0} cancelled")]
    Cancelled(&'static str),

    /// The node answered with a JSON-RPC error envelope.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// A REST query returned a non-2xx status other than 404.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Key loading or signature production failed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Transaction bytes could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl TxError {
    /// Shorthand for a [`TxError::Validation`].
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for connection failures, timeouts and cancellations.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout { .. } | Self::Cancelled(_)
        )
    }
}

impl From<reqwest::Error> for TxError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type for transaction operations.
pub type TxResult<T> = Result<T, TxError>;
