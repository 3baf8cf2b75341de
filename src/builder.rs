//! Framework-independent transaction builder facade.
//!
//! # Responsibilities
//! - One contract (`build_tx`, `sign_tx`, `broadcast_tx`, `supported_tx_types`)
//!   for every framework family
//! - Select the family implementation from a [`NetworkConfig`]
//!
//! # Data Flow
//! ```text
//! TxBuildRequest
//!     → build_tx      (validate payload, resolve account, fee, encode)
//!     → UnsignedTx    (reference bytes + sign-doc)
//!     → sign_tx       (pure, no I/O)
//!     → SignedTx
//!     → broadcast_tx  (JSON-RPC submit, rejection returned as data)
//!     → TxBroadcastResult
//! ```
//!
//! # Design Decisions
//! - Each implementation owns its resolver, encoder, signer and broadcaster;
//!   the families share no base type.
//! - Builders hold no mutable state. Concurrent builds for one signer race
//!   on the node's sequence/nonce and must be serialized by the caller.

use async_trait::async_trait;

use crate::config::{validate_network, NetworkConfig};
use crate::context::CallContext;
use crate::cosmos::CosmosTxBuilder;
use crate::error::{TxError, TxResult};
use crate::evm::EvmTxBuilder;
use crate::types::{
    Framework, SdkVersion, SignedTx, SigningKey, TxBroadcastResult, TxBuildRequest, TxType,
    UnsignedTx,
};

/// Builds, signs and broadcasts transactions for one (endpoint, chain id) pair.
#[async_trait]
pub trait TxBuilder: Send + Sync {
    fn framework(&self) -> Framework;

    /// Detected or declared version of the chain this builder is bound to.
    fn sdk_version(&self) -> &SdkVersion;

    /// Transaction types this builder accepts; a pure function of its features.
    fn supported_tx_types(&self) -> Vec<TxType>;

    /// Validate `req`, resolve signer state and encode an unsigned transaction.
    ///
    /// # Errors
    /// - [`TxError::UnsupportedTxType`] for a type the builder does not advertise
    /// - [`TxError::Validation`] for a malformed payload or request field
    /// - [`TxError::NotFound`] when the sender account does not exist on-chain
    async fn build_tx(&self, ctx: &CallContext, req: &TxBuildRequest) -> TxResult<UnsignedTx>;

    /// Sign `unsigned.sign_doc` with `key` and attach the signature. No I/O.
    fn sign_tx(&self, unsigned: &UnsignedTx, key: &SigningKey) -> TxResult<SignedTx>;

    /// Submit a signed transaction.
    ///
    /// An application-level rejection is `Ok` with a nonzero `code`.
    async fn broadcast_tx(&self, ctx: &CallContext, signed: &SignedTx)
        -> TxResult<TxBroadcastResult>;

    /// True when `tx_type` is advertised by this builder.
    fn supports(&self, tx_type: TxType) -> bool {
        self.supported_tx_types().contains(&tx_type)
    }
}

/// Connect a builder for `network`, selected by its framework tag.
///
/// Cosmos builders probe the node for its application version unless the
/// configuration carries an `sdk_version` hint; a failed probe fails here.
pub async fn connect_builder(
    network: &NetworkConfig,
    ctx: &CallContext,
) -> TxResult<Box<dyn TxBuilder>> {
    let problems = validate_network(network);
    if !problems.is_empty() {
        let joined = problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(TxError::Configuration(joined));
    }

    let builder: Box<dyn TxBuilder> = match network.framework {
        Framework::Cosmos => Box::new(CosmosTxBuilder::connect(network, ctx).await?),
        Framework::Evm => Box::new(EvmTxBuilder::connect(network, ctx).await?),
    };

    tracing::info!(
        framework = %builder.framework(),
        chain_id = %network.chain_id,
        version = %builder.sdk_version().version,
        "Transaction builder ready"
    );
    Ok(builder)
}
