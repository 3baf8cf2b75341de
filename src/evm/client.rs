//! JSON-RPC client for EVM nodes.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint through an alloy provider
//! - Query the pending-pool nonce and the suggested gas price
//! - Check the node's chain id against the configured one
//! - Map alloy transport failures into [`TxError`]

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::{RpcError, TransportErrorKind};

use crate::context::CallContext;
use crate::error::{TxError, TxResult};
use crate::rpc::parse_endpoint;

/// Provider wrapper bound to one endpoint and chain.
#[derive(Clone)]
pub struct EvmClient {
    provider: Arc<dyn Provider + Send + Sync>,
    endpoint: url::Url,
    chain_id: u64,
    request_timeout: Duration,
}

impl EvmClient {
    /// Create a client. No request is made until the first query.
    pub fn new(endpoint: &str, chain_id: u64, request_timeout: Duration) -> TxResult<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        let provider = ProviderBuilder::new().connect_http(endpoint.clone());
        Ok(Self {
            provider: Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
            endpoint,
            chain_id,
            request_timeout,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Compare the node's chain id with the configured one.
    ///
    /// A mismatch or an unreachable node is logged, not returned: signing is
    /// always bound to the configured id.
    pub async fn verify_chain_id(&self, ctx: &CallContext) {
        match self.get_chain_id(ctx).await {
            Ok(actual) if actual == self.chain_id => {
                tracing::info!(endpoint = %self.endpoint, chain_id = actual, "EVM client initialized");
            }
            Ok(actual) => {
                tracing::warn!(
                    expected = self.chain_id,
                    actual,
                    "Node reports a different chain id; transactions are signed for the configured one"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "EVM client initialized but chain verification failed"
                );
            }
        }
    }

    /// `eth_chainId`.
    pub async fn get_chain_id(&self, ctx: &CallContext) -> TxResult<u64> {
        self.guarded(ctx, "eth_chainId", async {
            self.provider.get_chain_id().await.map_err(map_rpc_error)
        })
        .await
    }

    /// `eth_getTransactionCount` at the pending block.
    pub async fn pending_nonce(&self, ctx: &CallContext, address: Address) -> TxResult<u64> {
        self.guarded(ctx, "eth_getTransactionCount", async {
            self.provider
                .get_transaction_count(address)
                .pending()
                .await
                .map_err(map_rpc_error)
        })
        .await
    }

    /// `eth_gasPrice`, in wei.
    pub async fn gas_price(&self, ctx: &CallContext) -> TxResult<u128> {
        self.guarded(ctx, "eth_gasPrice", async {
            self.provider.get_gas_price().await.map_err(map_rpc_error)
        })
        .await
    }

    /// Apply the per-request timeout, then the caller's context.
    async fn guarded<T, F>(&self, ctx: &CallContext, method: &'static str, fut: F) -> TxResult<T>
    where
        F: std::future::Future<Output = TxResult<T>>,
    {
        let started = std::time::Instant::now();
        let limit = self.request_timeout;
        let result = ctx
            .run(method, async {
                tokio::time::timeout(limit, fut)
                    .await
                    .map_err(|_| TxError::Timeout {
                        operation: method,
                        limit,
                    })?
            })
            .await;
        crate::observability::metrics::record_rpc_duration(method, started.elapsed());
        if let Err(e) = &result {
            tracing::warn!(endpoint = %self.endpoint, method, error = %e, "EVM RPC call failed");
        }
        result
    }
}

impl std::fmt::Debug for EvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("chain_id", &self.chain_id)
            .field("timeout_secs", &self.request_timeout.as_secs())
            .finish()
    }
}

/// Error envelopes keep their code; everything else is transport.
fn map_rpc_error(err: RpcError<TransportErrorKind>) -> TxError {
    match err.as_error_resp() {
        Some(payload) => TxError::Rpc {
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => TxError::Transport(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn stub(rpc_method: &str, reply: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": rpc_method})))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        assert!(EvmClient::new("localhost:8545", 1, Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_pending_nonce() {
        let server = stub(
            "eth_getTransactionCount",
            json!({"jsonrpc": "2.0", "id": 0, "result": "0x5"}),
        )
        .await;
        let client = EvmClient::new(&server.uri(), 31337, Duration::from_secs(5)).unwrap();
        let nonce = client
            .pending_nonce(&CallContext::background(), Address::ZERO)
            .await
            .unwrap();
        assert_eq!(nonce, 5);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["params"][1], "pending");
    }

    #[tokio::test]
    async fn test_gas_price() {
        let server = stub(
            "eth_gasPrice",
            json!({"jsonrpc": "2.0", "id": 0, "result": "0x77359400"}),
        )
        .await;
        let client = EvmClient::new(&server.uri(), 31337, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.gas_price(&CallContext::background()).await.unwrap(),
            2_000_000_000
        );
    }

    #[tokio::test]
    async fn test_error_envelope_maps_to_rpc() {
        let server = stub(
            "eth_gasPrice",
            json!({"jsonrpc": "2.0", "id": 0, "error": {"code": -32000, "message": "header not found"}}),
        )
        .await;
        let client = EvmClient::new(&server.uri(), 31337, Duration::from_secs(5)).unwrap();
        let err = client.gas_price(&CallContext::background()).await.unwrap_err();
        assert!(matches!(err, TxError::Rpc { code: -32000, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport() {
        let client = EvmClient::new("http://127.0.0.1:9", 1, Duration::from_secs(2)).unwrap();
        let err = client.gas_price(&CallContext::background()).await.unwrap_err();
        assert!(err.is_transport());
    }
}
