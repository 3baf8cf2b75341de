//! RLP-encoded (EVM) transaction family.
//!
//! # Data Flow
//! ```text
//! TxBuildRequest
//!     → payload      (EvmTransfer)
//!     → client.rs    (pending nonce, suggested gas price)
//!     → encoder.rs   (legacy tx, EIP-155 signing payload + keccak256)
//!     → signer.rs    (recoverable secp256k1 signature, v/r/s attached)
//!     → broadcast.rs (eth_sendRawTransaction, 0x-hex)
//! ```
//!
//! # Design Decisions
//! - Only legacy transactions are built; no fee-market fields
//! - An offline builder (no node) exists for tests: nonce 0, 1 gwei

pub mod broadcast;
pub mod builder;
pub mod client;
pub mod encoder;
pub mod signer;

pub use broadcast::EvmBroadcaster;
pub use builder::EvmTxBuilder;
pub use client::EvmClient;
