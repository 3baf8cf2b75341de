//! Transaction lifecycle engine for ephemeral development networks.
//!
//! # Architecture Overview
//!
//! ```text
//!     (tx type, sender, JSON payload)
//!                 │
//!                 ▼
//!     ┌──────────────────────────────────────────────────────────┐
//!     │                  TxBuilder (builder.rs)                   │
//!     │                                                           │
//!     │   ┌──────────────────────┐   ┌──────────────────────┐     │
//!     │   │   cosmos (protobuf)  │   │      evm (RLP)       │     │
//!     │   │  features  account   │   │  client (nonce, gas) │     │
//!     │   │  encoder   signer    │   │  encoder   signer    │     │
//!     │   │  broadcast           │   │  broadcast           │     │
//!     │   └──────────┬───────────┘   └──────────┬───────────┘     │
//!     │              └────────────┬─────────────┘                 │
//!     │                           ▼                               │
//!     │       payload · fees · rpc · context · error · types      │
//!     └──────────────────────────────────────────────────────────┘
//!                 │
//!                 ▼
//!     UnsignedTx → SignedTx → TxBroadcastResult
//! ```

// Facade
pub mod builder;
pub mod types;

// Framework families
pub mod cosmos;
pub mod evm;

// Shared pieces
pub mod fees;
pub mod payload;
pub mod rpc;

// Cross-cutting concerns
pub mod config;
pub mod context;
pub mod error;
pub mod observability;

pub use builder::{connect_builder, TxBuilder};
pub use config::{NetworkConfig, TxConfig};
pub use context::CallContext;
pub use cosmos::CosmosTxBuilder;
pub use error::{TxError, TxResult};
pub use evm::EvmTxBuilder;
pub use types::{
    AccountInfo, Feature, Framework, SdkVersion, SignedTx, SigningKey, TxBroadcastResult,
    TxBuildRequest, TxType, UnsignedTx,
};
