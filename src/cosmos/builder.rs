//! [`TxBuilder`] for protobuf-encoded (Cosmos SDK) chains.

use async_trait::async_trait;
use k256::ecdsa::VerifyingKey;

use crate::builder::TxBuilder;
use crate::config::NetworkConfig;
use crate::context::CallContext;
use crate::cosmos::account::AccountResolver;
use crate::cosmos::address::AddressCodec;
use crate::cosmos::broadcast::CosmosBroadcaster;
use crate::cosmos::encoder::{encode_message, encode_parts, TxParts};
use crate::cosmos::features::{self, FeatureDetector};
use crate::cosmos::signer;
use crate::error::{TxError, TxResult};
use crate::fees;
use crate::observability::metrics;
use crate::payload::cosmos::parse_message;
use crate::rpc::RpcClient;
use crate::types::{
    Feature, Framework, SdkVersion, SignedTx, SigningKey, TxBroadcastResult, TxBuildRequest,
    TxType, UnsignedTx,
};

/// Builder bound to one Cosmos chain.
#[derive(Debug, Clone)]
pub struct CosmosTxBuilder {
    chain_id: String,
    codec: AddressCodec,
    sdk: SdkVersion,
    default_gas_limit: u64,
    accounts: AccountResolver,
    broadcaster: CosmosBroadcaster,
}

impl CosmosTxBuilder {
    /// Connect to the node described by `network`.
    ///
    /// Without an `sdk_version` hint the node's `abci_info` is queried; a
    /// detection failure is returned here rather than on first use.
    pub async fn connect(network: &NetworkConfig, ctx: &CallContext) -> TxResult<Self> {
        let sdk = match network.sdk_version.as_deref() {
            Some(hint) => {
                let sdk = features::sdk_version(hint)?;
                tracing::debug!(version = %sdk.version, "Using configured application version");
                sdk
            }
            None => {
                let rpc = RpcClient::new(&network.rpc_endpoint, network.request_timeout())?;
                FeatureDetector::new(rpc).detect(ctx).await?
            }
        };
        Self::with_sdk_version(network, sdk)
    }

    /// Construct without probing the node.
    pub fn with_sdk_version(network: &NetworkConfig, sdk: SdkVersion) -> TxResult<Self> {
        if network.chain_id.trim().is_empty() {
            return Err(TxError::Configuration("chain id is required".to_string()));
        }
        if sdk.framework != Framework::Cosmos {
            return Err(TxError::Configuration(format!(
                "version {} belongs to the {} framework",
                sdk.version, sdk.framework
            )));
        }

        let rpc = RpcClient::new(&network.rpc_endpoint, network.request_timeout())?;
        let rest = RpcClient::new(network.rest_endpoint(), network.request_timeout())?;
        let codec = AddressCodec::new(&network.address_prefix, &network.validator_prefix())?;

        Ok(Self {
            chain_id: network.chain_id.clone(),
            codec,
            sdk,
            default_gas_limit: network.default_gas_limit,
            accounts: AccountResolver::new(rest),
            broadcaster: CosmosBroadcaster::new(rpc),
        })
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn codec(&self) -> &AddressCodec {
        &self.codec
    }

    fn check_chain_id(&self, requested: &str) -> TxResult<()> {
        if requested.is_empty() || requested == self.chain_id {
            return Ok(());
        }
        Err(TxError::validation(
            "chainId",
            format!(
                "request targets chain {:?} but the builder is bound to {:?}",
                requested, self.chain_id
            ),
        ))
    }
}

fn check_pub_key(pub_key: &[u8]) -> TxResult<()> {
    if pub_key.len() != 33 {
        return Err(TxError::validation(
            "pubKey",
            format!("expected a 33-byte compressed secp256k1 key, got {} bytes", pub_key.len()),
        ));
    }
    VerifyingKey::from_sec1_bytes(pub_key)
        .map(|_| ())
        .map_err(|_| TxError::validation("pubKey", "not a valid secp256k1 point"))
}

#[async_trait]
impl TxBuilder for CosmosTxBuilder {
    fn framework(&self) -> Framework {
        Framework::Cosmos
    }

    fn sdk_version(&self) -> &SdkVersion {
        &self.sdk
    }

    fn supported_tx_types(&self) -> Vec<TxType> {
        features::supported_tx_types(&self.sdk)
    }

    async fn build_tx(&self, ctx: &CallContext, req: &TxBuildRequest) -> TxResult<UnsignedTx> {
        if !self.supports(req.tx_type) {
            return Err(TxError::UnsupportedTxType(req.tx_type.to_string()));
        }
        self.check_chain_id(&req.chain_id)?;
        self.codec.check_account("sender", &req.sender)?;

        // Everything below up to account resolution is local.
        let msg = parse_message(req.tx_type, &req.sender, &req.payload, &self.codec)?;
        let fee = fees::cosmos_fee(req.gas_limit, req.gas_price.as_deref())?;
        if let Some(pub_key) = &req.pub_key {
            check_pub_key(pub_key)?;
        }

        let account = self.accounts.resolve(ctx, &req.sender).await?;
        let pub_key = req.pub_key.as_deref().or(account.pub_key.as_deref());
        if pub_key.is_none() {
            tracing::warn!(
                sender = %req.sender,
                "No public key for signer; the node will reject the signed transaction"
            );
        }
        let gas_limit = if req.gas_limit == 0 {
            self.default_gas_limit
        } else {
            req.gas_limit
        };

        let parts = encode_parts(&TxParts {
            messages: vec![encode_message(&msg, self.sdk.has(Feature::GovV1))],
            memo: &req.memo,
            fee: &fee,
            gas_limit,
            pub_key,
            sequence: account.sequence,
        });

        let unsigned = UnsignedTx {
            tx_bytes: parts.tx_raw_bytes(),
            sign_doc: parts.sign_doc_bytes(&self.chain_id, account.account_number),
            account_number: account.account_number,
            sequence: account.sequence,
        };

        metrics::record_build(Framework::Cosmos, req.tx_type);
        let fee: Vec<String> = fee.iter().map(ToString::to_string).collect();
        tracing::debug!(
            tx_type = %req.tx_type,
            sender = %req.sender,
            account_number = unsigned.account_number,
            sequence = unsigned.sequence,
            gas_limit,
            fee = ?fee,
            "Built unsigned Cosmos transaction"
        );
        Ok(unsigned)
    }

    fn sign_tx(&self, unsigned: &UnsignedTx, key: &SigningKey) -> TxResult<SignedTx> {
        signer::sign_tx(unsigned, key)
    }

    async fn broadcast_tx(
        &self,
        ctx: &CallContext,
        signed: &SignedTx,
    ) -> TxResult<TxBroadcastResult> {
        let result = self.broadcaster.broadcast(ctx, signed).await?;
        metrics::record_broadcast(Framework::Cosmos, &result);
        Ok(result)
    }
}
