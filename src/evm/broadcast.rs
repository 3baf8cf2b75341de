//! `eth_sendRawTransaction` submission.
//!
//! A JSON-RPC error envelope (nonce too low, underpriced, ...) is the EVM
//! equivalent of an application rejection and is folded into the result's
//! `code`/`log`. The code keeps its signed value.

use crate::context::CallContext;
use crate::error::{TxError, TxResult};
use crate::evm::encoder::tx_hash;
use crate::rpc::{RpcClient, RpcOutcome};
use crate::types::{SignedTx, TxBroadcastResult};

#[derive(Debug, Clone)]
pub struct EvmBroadcaster {
    rpc: RpcClient,
}

impl EvmBroadcaster {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    pub async fn broadcast(
        &self,
        ctx: &CallContext,
        signed: &SignedTx,
    ) -> TxResult<TxBroadcastResult> {
        if signed.tx_bytes.is_empty() {
            return Err(TxError::validation("tx_bytes", "signed transaction is empty"));
        }

        let raw = format!("0x{}", hex::encode(&signed.tx_bytes));
        let outcome: RpcOutcome<String> = self
            .rpc
            .call(ctx, "eth_sendRawTransaction", [raw])
            .await?;

        let result = match outcome {
            RpcOutcome::Result(hash) => {
                tracing::info!(tx_hash = %hash, "Transaction accepted into mempool");
                TxBroadcastResult {
                    tx_hash: hash,
                    code: 0,
                    log: String::new(),
                    height: None,
                }
            }
            RpcOutcome::Error(error) => {
                let local_hash = tx_hash(&signed.tx_bytes);
                tracing::warn!(
                    tx_hash = %local_hash,
                    code = error.code,
                    message = %error.message,
                    "Transaction rejected by node"
                );
                TxBroadcastResult {
                    tx_hash: local_hash,
                    code: error.code,
                    log: error.message,
                    height: None,
                }
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signed() -> SignedTx {
        SignedTx {
            tx_bytes: vec![0xf8, 0x01, 0x02],
            signature: vec![0; 65],
            pub_key: vec![2; 33],
        }
    }

    async fn broadcaster(reply: serde_json::Value) -> (MockServer, EvmBroadcaster) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "eth_sendRawTransaction",
                "params": ["0xf80102"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .mount(&server)
            .await;
        let rpc = RpcClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        (server, EvmBroadcaster::new(rpc))
    }

    #[tokio::test]
    async fn test_accepted() {
        let hash = "0x9fc76417374aa880d4449a1f7f31ec597f00b1f6f3dd2d66f4c9c6c445836d8b";
        let (_server, b) = broadcaster(json!({"jsonrpc": "2.0", "id": 1, "result": hash})).await;
        let result = b.broadcast(&CallContext::background(), &signed()).await.unwrap();
        assert_eq!(result.tx_hash, hash);
        assert!(result.is_accepted());
    }

    #[tokio::test]
    async fn test_error_envelope_is_data() {
        let (_server, b) = broadcaster(json!({
            "jsonrpc": "2.0", "id": 1,
            "error": {"code": -32000, "message": "nonce too low"}
        }))
        .await;
        let result = b.broadcast(&CallContext::background(), &signed()).await.unwrap();
        assert_eq!(result.code, -32000);
        assert_eq!(result.log, "nonce too low");
        assert_eq!(result.tx_hash, tx_hash(&signed().tx_bytes));
        assert!(!result.is_accepted());
    }

    #[tokio::test]
    async fn test_deadline_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(json!({"result": "0x1"})),
            )
            .mount(&server)
            .await;
        let rpc = RpcClient::new(&server.uri(), Duration::from_secs(30)).unwrap();
        let err = EvmBroadcaster::new(rpc)
            .broadcast(&CallContext::with_timeout(Duration::from_millis(100)), &signed())
            .await
            .unwrap_err();
        assert!(matches!(err, TxError::Timeout { .. }));
        assert!(err.is_transport());
    }
}
