//! Shared stub nodes for integration tests.

#![allow(dead_code)]

use bech32::{Bech32, Hrp};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use devnet_tx::{Framework, NetworkConfig};

/// Development key shared by both families (first Anvil account).
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn key_bytes() -> Vec<u8> {
    hex::decode(TEST_PRIVATE_KEY).unwrap()
}

pub fn bech32_address(prefix: &str, bytes: &[u8]) -> String {
    bech32::encode::<Bech32>(Hrp::parse(prefix).unwrap(), bytes).unwrap()
}

pub fn cosmos_sender() -> String {
    bech32_address("cosmos", &[7u8; 20])
}

/// A CometBFT RPC + REST stub serving `abci_info` and one account.
pub async fn start_cosmos_node(version: &str, account_number: u64, sequence: u64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/abci_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": -1,
            "result": {"response": {"data": "simd", "version": version, "last_block_height": "100"}}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/cosmos/auth/v1beta1/accounts/{}", cosmos_sender())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": {
                "@type": "/cosmos.auth.v1beta1.BaseAccount",
                "address": cosmos_sender(),
                "pub_key": null,
                "account_number": account_number.to_string(),
                "sequence": sequence.to_string()
            }
        })))
        .mount(&server)
        .await;

    server
}

/// Mount a `broadcast_tx_sync` reply on `server`.
pub async fn mount_broadcast_sync(server: &MockServer, result: serde_json::Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "broadcast_tx_sync"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0", "id": 1, "result": result
        })))
        .mount(server)
        .await;
}

pub fn cosmos_network(endpoint: &str, chain_id: &str) -> NetworkConfig {
    NetworkConfig {
        framework: Framework::Cosmos,
        rpc_endpoint: endpoint.to_string(),
        chain_id: chain_id.to_string(),
        ..Default::default()
    }
}

/// JSON-RPC reply that echoes the request id.
pub struct RpcReply(pub serde_json::Value);

impl RpcReply {
    pub fn result(result: serde_json::Value) -> Self {
        Self(json!({ "result": result }))
    }

    pub fn error(code: i64, message: &str) -> Self {
        Self(json!({ "error": {"code": code, "message": message} }))
    }
}

impl Respond for RpcReply {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = serde_json::from_slice::<serde_json::Value>(&request.body)
            .ok()
            .and_then(|body| body.get("id").cloned())
            .unwrap_or(json!(0));
        let mut body = self.0.clone();
        body["jsonrpc"] = json!("2.0");
        body["id"] = id;
        ResponseTemplate::new(200).set_body_json(body)
    }
}

/// An EVM JSON-RPC stub answering chain id, pending nonce and gas price.
pub async fn start_evm_node(chain_id: u64, nonce: u64, gas_price: u128) -> MockServer {
    let server = MockServer::start().await;
    for (rpc_method, result) in [
        ("eth_chainId", format!("{:#x}", chain_id)),
        ("eth_getTransactionCount", format!("{:#x}", nonce)),
        ("eth_gasPrice", format!("{:#x}", gas_price)),
    ] {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": rpc_method})))
            .respond_with(RpcReply::result(json!(result)))
            .mount(&server)
            .await;
    }
    server
}

pub fn evm_network(endpoint: &str, chain_id: u64) -> NetworkConfig {
    NetworkConfig {
        framework: Framework::Evm,
        rpc_endpoint: endpoint.to_string(),
        chain_id: chain_id.to_string(),
        ..Default::default()
    }
}

/// Number of requests the stub has seen so far.
pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}
