//! Protobuf (Cosmos SDK) transaction family.
//!
//! # Data Flow
//! ```text
//! TxBuildRequest
//!     → features.rs   (advertised types, gov v1 or v1beta1)
//!     → payload       (CosmosMsg, addresses checked by address.rs)
//!     → fees          (gas price × gas limit, truncated)
//!     → account.rs    (GET /cosmos/auth/v1beta1/accounts/{addr})
//!     → encoder.rs    (TxRaw without signatures + SignDoc bytes)
//!     → signer.rs     (secp256k1 over SHA-256(SignDoc), one signature)
//!     → broadcast.rs  (broadcast_tx_sync, base64 tx)
//! ```
//!
//! # Design Decisions
//! - The signer info (public key, sequence, direct mode) is part of the
//!   signed auth info, so it is fixed at build time
//! - Bech32 prefixes belong to the builder's [`AddressCodec`]

pub mod account;
pub mod address;
pub mod broadcast;
pub mod builder;
pub mod encoder;
pub mod features;
pub mod signer;

pub use account::AccountResolver;
pub use address::AddressCodec;
pub use broadcast::CosmosBroadcaster;
pub use builder::CosmosTxBuilder;
pub use features::FeatureDetector;
