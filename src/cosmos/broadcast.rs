//! `broadcast_tx_sync` submission.
//!
//! A reply with a nonzero `code` is an application-level rejection and is
//! returned as data. Only transport failures, non-2xx statuses and JSON-RPC
//! error envelopes are errors.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use crate::context::CallContext;
use crate::error::{TxError, TxResult};
use crate::rpc::{RpcClient, RpcOutcome};
use crate::types::{SignedTx, TxBroadcastResult};

#[derive(Debug, Deserialize)]
struct BroadcastSyncResult {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    log: String,
}

#[derive(Debug, Clone)]
pub struct CosmosBroadcaster {
    rpc: RpcClient,
}

impl CosmosBroadcaster {
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

        let params = serde_json::json!({ "tx": BASE64.encode(&signed.tx_bytes) });
        let outcome: RpcOutcome<BroadcastSyncResult> =
            self.rpc.call(ctx, "broadcast_tx_sync", params).await?;

        match outcome {
            RpcOutcome::Result(result) => {
                let result = TxBroadcastResult {
                    tx_hash: result.hash,
                    code: result.code,
                    log: result.log,
                    height: None,
                };
                if result.is_accepted() {
                    tracing::info!(tx_hash = %result.tx_hash, "Transaction accepted into mempool");
                } else {
                    tracing::warn!(
                        tx_hash = %result.tx_hash,
                        code = result.code,
                        log = %result.log,
                        "Transaction rejected by application"
                    );
                }
                Ok(result)
            }
            RpcOutcome::Error(error) => {
                let message = match &error.data {
                    Some(serde_json::Value::String(data)) => format!("{}: {}", error.message, data),
                    Some(data) => format!("{}: {}", error.message, data),
                    None => error.message,
                };
                tracing::warn!(code = error.code, message = %message, "broadcast_tx_sync failed");
                Err(TxError::Rpc {
                    code: error.code,
                    message,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signed() -> SignedTx {
        SignedTx {
            tx_bytes: vec![1, 2, 3],
            signature: vec![0; 64],
            pub_key: vec![2; 33],
        }
    }

    async fn broadcaster(reply: ResponseTemplate) -> (MockServer, CosmosBroadcaster) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "method": "broadcast_tx_sync",
                "params": {"tx": "AQID"}
            })))
            .respond_with(reply)
            .mount(&server)
            .await;
        let rpc = RpcClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        (server, CosmosBroadcaster::new(rpc))
    }

    #[tokio::test]
    async fn test_accepted() {
        let (_server, b) = broadcaster(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0", "id": 1,
            "result": {"code": 0, "hash": "ABC123DEF456", "log": "success"}
        })))
        .await;

        let result = b.broadcast(&CallContext::background(), &signed()).await.unwrap();
        assert_eq!(
            result,
            TxBroadcastResult {
                tx_hash: "ABC123DEF456".into(),
                code: 0,
                log: "success".into(),
                height: None,
            }
        );
    }

    #[tokio::test]
    async fn test_rejection_is_data() {
        let (_server, b) = broadcaster(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {"code": 5, "hash": "FFEE", "log": "insufficient funds", "codespace": "sdk"}
        })))
        .await;

        let result = b.broadcast(&CallContext::background(), &signed()).await.unwrap();
        assert_eq!(result.code, 5);
        assert!(!result.is_accepted());
        assert_eq!(result.log, "insufficient funds");
    }

    #[tokio::test]
    async fn test_error_envelope_is_error() {
        let (_server, b) = broadcaster(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"code": -32603, "message": "Internal error", "data": "tx already exists in cache"}
        })))
        .await;

        let err = b.broadcast(&CallContext::background(), &signed()).await.unwrap_err();
        match err {
            TxError::Rpc { code, message } => {
                assert_eq!(code, -32603);
                assert_eq!(message, "Internal error: tx already exists in cache");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_failure_is_error() {
        let (_server, b) = broadcaster(ResponseTemplate::new(503)).await;
        let err = b.broadcast(&CallContext::background(), &signed()).await.unwrap_err();
        assert!(matches!(err, TxError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let (_server, b) = broadcaster(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(serde_json::json!({"result": {"code": 0}})),
        )
        .await;
        let ctx = CallContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = b.broadcast(&ctx, &signed()).await.unwrap_err();
        assert!(matches!(err, TxError::Cancelled(_)));
        assert!(err.is_transport());
    }
}
