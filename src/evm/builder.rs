//! [`TxBuilder`] for RLP-encoded (EVM) chains.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::builder::TxBuilder;
use crate::config::NetworkConfig;
use crate::context::CallContext;
use crate::error::{TxError, TxResult};
use crate::evm::broadcast::EvmBroadcaster;
use crate::evm::client::EvmClient;
use crate::evm::encoder::{encode_unsigned, legacy_transfer, signing_hash};
use crate::evm::signer;
use crate::fees::{self, DEFAULT_GAS_PRICE_WEI};
use crate::observability::metrics;
use crate::payload::evm::{parse_address, parse_transfer};
use crate::rpc::RpcClient;
use crate::types::{
    Framework, SdkVersion, SignedTx, SigningKey, TxBroadcastResult, TxBuildRequest, TxType,
    UnsignedTx,
};

/// Live node connection: provider queries plus raw JSON-RPC broadcast.
#[derive(Debug, Clone)]
struct NodeLink {
    client: EvmClient,
    broadcaster: EvmBroadcaster,
}

/// Builder bound to one EVM chain.
#[derive(Debug, Clone)]
pub struct EvmTxBuilder {
    chain_id: u64,
    sdk: SdkVersion,
    node: Option<NodeLink>,
}

/// Parse a decimal EVM chain id.
pub fn parse_chain_id(raw: &str) -> TxResult<u64> {
    raw.trim().parse::<u64>().map_err(|_| {
        TxError::Configuration(format!("EVM chain id must be a decimal integer, got {:?}", raw))
    })
}

fn evm_version(hint: Option<&str>) -> SdkVersion {
    SdkVersion {
        framework: Framework::Evm,
        version: hint.unwrap_or_default().to_string(),
        features: BTreeSet::new(),
    }
}

impl EvmTxBuilder {
    /// Connect to the node described by `network`.
    ///
    /// The node's chain id is compared with the configured one; a mismatch
    /// is logged and the configured id is used for signing.
    pub async fn connect(network: &NetworkConfig, ctx: &CallContext) -> TxResult<Self> {
        let chain_id = parse_chain_id(&network.chain_id)?;
        let client = EvmClient::new(&network.rpc_endpoint, chain_id, network.request_timeout())?;
        let rpc = RpcClient::new(&network.rpc_endpoint, network.request_timeout())?;
        client.verify_chain_id(ctx).await;

        Ok(Self {
            chain_id,
            sdk: evm_version(network.sdk_version.as_deref()),
            node: Some(NodeLink {
                client,
                broadcaster: EvmBroadcaster::new(rpc),
            }),
        })
    }

    /// A builder with no node connection: nonce 0, default gas price, no
    /// broadcast. For tests and offline signing only.
    pub fn offline(chain_id: u64) -> Self {
        Self {
            chain_id,
            sdk: evm_version(None),
            node: None,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_offline(&self) -> bool {
        self.node.is_none()
    }

    fn check_chain_id(&self, requested: &str) -> TxResult<()> {
        if requested.is_empty() {
            return Ok(());
        }
        match requested.trim().parse::<u64>() {
            Ok(id) if id == self.chain_id => Ok(()),
            _ => Err(TxError::validation(
                "chainId",
                format!(
                    "request targets chain {:?} but the builder is bound to {}",
                    requested, self.chain_id
                ),
            )),
        }
    }

    /// Request value, then node suggestion, then 1 gwei.
    pub async fn resolve_gas_price(&self, ctx: &CallContext, requested: Option<&str>) -> TxResult<u128> {
        if let Some(raw) = requested.map(str::trim).filter(|raw| !raw.is_empty()) {
            return fees::parse_wei_gas_price(raw);
        }
        match &self.node {
            Some(node) => node.client.gas_price(ctx).await,
            None => {
                tracing::warn!(
                    gas_price = DEFAULT_GAS_PRICE_WEI,
                    "No node connection, using default gas price"
                );
                Ok(DEFAULT_GAS_PRICE_WEI)
            }
        }
    }

    async fn resolve_nonce(
        &self,
        ctx: &CallContext,
        sender: alloy::primitives::Address,
    ) -> TxResult<u64> {
        match &self.node {
            Some(node) => node.client.pending_nonce(ctx, sender).await,
            None => {
                tracing::warn!(sender = %sender, "No node connection, using nonce 0");
                Ok(0)
            }
        }
    }
}

#[async_trait]
impl TxBuilder for EvmTxBuilder {
    fn framework(&self) -> Framework {
        Framework::Evm
    }

    fn sdk_version(&self) -> &SdkVersion {
        &self.sdk
    }

    fn supported_tx_types(&self) -> Vec<TxType> {
        vec![TxType::NativeTransfer]
    }

    async fn build_tx(&self, ctx: &CallContext, req: &TxBuildRequest) -> TxResult<UnsignedTx> {
        if !self.supports(req.tx_type) {
            return Err(TxError::UnsupportedTxType(req.tx_type.to_string()));
        }
        self.check_chain_id(&req.chain_id)?;
        let sender = parse_address("sender", &req.sender)?;
        let transfer = parse_transfer(req.tx_type, &req.payload)?;
        let gas_limit = if req.gas_limit == 0 {
            fees::intrinsic_gas(&transfer.data)
        } else {
            req.gas_limit
        };

        let gas_price = self.resolve_gas_price(ctx, req.gas_price.as_deref()).await?;
        let nonce = self.resolve_nonce(ctx, sender).await?;

        let tx = legacy_transfer(&transfer, nonce, gas_price, gas_limit, self.chain_id);
        let unsigned = UnsignedTx {
            tx_bytes: encode_unsigned(&tx),
            sign_doc: signing_hash(&tx).to_vec(),
            account_number: 0,
            sequence: nonce,
        };

        metrics::record_build(Framework::Evm, req.tx_type);
        tracing::debug!(
            sender = %sender,
            to = %transfer.to,
            nonce,
            gas_price,
            gas_limit,
            "Built unsigned EVM transaction"
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
        let node = self.node.as_ref().ok_or_else(|| {
            TxError::Configuration("offline EVM builder cannot broadcast".to_string())
        })?;
        let result = node.broadcaster.broadcast(ctx, signed).await?;
        metrics::record_broadcast(Framework::Evm, &result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::encoder::decode_unsigned;
    use alloy::primitives::U256;
    use serde_json::json;

    const SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const TO: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    #[test]
    fn test_parse_chain_id() {
        assert_eq!(parse_chain_id("31337").unwrap(), 31337);
        assert!(matches!(parse_chain_id("0x7a69"), Err(TxError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_offline_gas_price_default() {
        let builder = EvmTxBuilder::offline(31337);
        let price = builder
            .resolve_gas_price(&CallContext::background(), None)
            .await
            .unwrap();
        assert_eq!(price, 1_000_000_000);

        let price = builder
            .resolve_gas_price(&CallContext::background(), Some("5wei"))
            .await
            .unwrap();
        assert_eq!(price, 5);
    }

    #[tokio::test]
    async fn test_offline_build() {
        let builder = EvmTxBuilder::offline(31337);
        let req = TxBuildRequest::new(
            TxType::NativeTransfer,
            SENDER,
            json!({"toAddress": TO, "amount": "1000000000000000000", "data": "0x0001"}),
        );
        let unsigned = builder.build_tx(&CallContext::background(), &req).await.unwrap();
        assert_eq!(unsigned.sequence, 0);
        assert_eq!(unsigned.sign_doc.len(), 32);

        let tx = decode_unsigned(&unsigned.tx_bytes).unwrap();
        assert_eq!(tx.gas_price, 1_000_000_000);
        assert_eq!(tx.gas_limit, 21_000 + 4 + 16);
        assert_eq!(tx.value, U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(tx.chain_id, Some(31337));
    }

    #[tokio::test]
    async fn test_request_validation() {
        let builder = EvmTxBuilder::offline(1);
        let ctx = CallContext::background();

        let req = TxBuildRequest::new(TxType::GovVote, SENDER, json!({}));
        assert!(matches!(
            builder.build_tx(&ctx, &req).await.unwrap_err(),
            TxError::UnsupportedTxType(_)
        ));

        let req = TxBuildRequest::new(TxType::NativeTransfer, "cosmos1abc", json!({"toAddress": TO, "amount": "1"}));
        assert!(matches!(
            builder.build_tx(&ctx, &req).await.unwrap_err(),
            TxError::Validation { ref field, .. } if field == "sender"
        ));

        let mut req = TxBuildRequest::new(TxType::NativeTransfer, SENDER, json!({"toAddress": TO, "amount": "1"}));
        req.chain_id = "5".to_string();
        assert!(matches!(
            builder.build_tx(&ctx, &req).await.unwrap_err(),
            TxError::Validation { ref field, .. } if field == "chainId"
        ));
    }

    #[tokio::test]
    async fn test_offline_cannot_broadcast() {
        let builder = EvmTxBuilder::offline(1);
        let signed = SignedTx {
            tx_bytes: vec![1],
            signature: vec![],
            pub_key: vec![],
        };
        let err = builder
            .broadcast_tx(&CallContext::background(), &signed)
            .await
            .unwrap_err();
        assert!(matches!(err, TxError::Configuration(_)));
    }
}
