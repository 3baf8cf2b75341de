//! HTTP and JSON-RPC plumbing shared by both framework families.
//!
//! # Responsibilities
//! - POST JSON-RPC 2.0 envelopes and split `result` from `error`
//! - GET REST paths relative to an endpoint
//! - Honour the caller's [`CallContext`] on every request
//!
//! Interpreting the outcome (error envelope as data or as failure) is left
//! to each family's broadcaster.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::context::CallContext;
use crate::error::{TxError, TxResult};
use crate::observability::metrics;

/// Outgoing JSON-RPC 2.0 request.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: P,
}

/// Incoming JSON-RPC 2.0 response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<R> {
    pub result: Option<R>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Either side of a JSON-RPC reply.
#[derive(Debug)]
pub enum RpcOutcome<R> {
    Result(R),
    Error(JsonRpcError),
}

/// Raw reply to a REST GET.
#[derive(Debug)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client bound to one node endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl RpcClient {
    /// Create a client for `endpoint`.
    ///
    /// `request_timeout` bounds each HTTP exchange independently of the
    /// caller's [`CallContext`].
    pub fn new(endpoint: &str, request_timeout: Duration) -> TxResult<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TxError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Absolute URL for `path` below the endpoint.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// POST a JSON-RPC request to the endpoint root.
    ///
    /// A non-2xx status is an [`TxError::Api`]; an `error` envelope is
    /// returned as [`RpcOutcome::Error`].
    pub async fn call<P, R>(
        &self,
        ctx: &CallContext,
        method: &'static str,
        params: P,
    ) -> TxResult<RpcOutcome<R>>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        tracing::debug!(endpoint = %self.endpoint, method, "JSON-RPC request");
        let started = Instant::now();

        let reply = ctx
            .run(method, async {
                let resp = self
                    .http
                    .post(self.endpoint.clone())
                    .json(&request)
                    .send()
                    .await?;
                let status = resp.status().as_u16();
                let body = resp.text().await?;
                Ok(HttpReply { status, body })
            })
            .await;
        metrics::record_rpc_duration(method, started.elapsed());
        let reply = reply?;

        if !reply.is_success() {
            return Err(TxError::Api {
                status: reply.status,
                body: reply.body,
            });
        }

        let parsed: JsonRpcResponse<R> = serde_json::from_str(&reply.body).map_err(|e| {
            TxError::Transport(format!("malformed {} response: {}", method, e))
        })?;

        match (parsed.result, parsed.error) {
            (_, Some(error)) => Ok(RpcOutcome::Error(error)),
            (Some(result), None) => Ok(RpcOutcome::Result(result)),
            (None, None) => Err(TxError::Transport(format!(
                "{} response carries neither result nor error",
                method
            ))),
        }
    }

    /// GET `path` below the endpoint and return the raw status and body.
    pub async fn get(
        &self,
        ctx: &CallContext,
        operation: &'static str,
        path: &str,
    ) -> TxResult<HttpReply> {
        let url = self.url_for(path);
        tracing::debug!(url = %url, operation, "REST request");
        let started = Instant::now();

        let reply = ctx
            .run(operation, async {
                let resp = self.http.get(&url).send().await?;
                let status = resp.status().as_u16();
                let body = resp.text().await?;
                Ok(HttpReply { status, body })
            })
            .await;
        metrics::record_rpc_duration(operation, started.elapsed());
        reply
    }
}

/// Validate an endpoint URL: it must be absolute http(s).
pub fn parse_endpoint(endpoint: &str) -> TxResult<Url> {
    if endpoint.trim().is_empty() {
        return Err(TxError::Configuration("endpoint is required".to_string()));
    }
    let url: Url = endpoint
        .parse()
        .map_err(|e| TxError::Configuration(format!("Invalid endpoint URL '{}': {}", endpoint, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TxError::Configuration(format!(
            "Invalid endpoint URL '{}': unsupported scheme {}",
            endpoint, other
        ))),
    }
}
