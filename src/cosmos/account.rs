//! Signer account resolution from the REST (LCD) endpoint.
//!
//! The `account` object is a tagged union. Module and vesting accounts wrap
//! the real fields in `base_account` (possibly under `base_vesting_account`).
//! Extraction follows field presence, not the `@type` tag, so account
//! subtypes unknown to this crate still resolve.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;

use crate::context::CallContext;
use crate::error::{TxError, TxResult};
use crate::rpc::RpcClient;
use crate::types::AccountInfo;

/// Wrappers are never nested deeper than this in practice.
const MAX_WRAPPER_DEPTH: usize = 4;

const WRAPPER_FIELDS: [(&str, &str); 2] = [
    ("base_account", "baseAccount"),
    ("base_vesting_account", "baseVestingAccount"),
];

/// Looks up account number, sequence and public key for a signer.
#[derive(Debug, Clone)]
pub struct AccountResolver {
    rest: RpcClient,
}

impl AccountResolver {
    pub fn new(rest: RpcClient) -> Self {
        Self { rest }
    }

    /// Fetch a fresh snapshot of `address`. Never cached.
    pub async fn resolve(&self, ctx: &CallContext, address: &str) -> TxResult<AccountInfo> {
        let path = format!("cosmos/auth/v1beta1/accounts/{}", address);
        let reply = self.rest.get(ctx, "account query", &path).await?;

        if reply.status == 404 {
            return Err(TxError::NotFound {
                address: address.to_string(),
            });
        }
        if !reply.is_success() {
            return Err(TxError::Api {
                status: reply.status,
                body: reply.body,
            });
        }

        let body: Value = serde_json::from_str(&reply.body)
            .map_err(|e| TxError::Transport(format!("malformed account response: {}", e)))?;
        let account = body
            .get("account")
            .ok_or_else(|| TxError::Transport("account response has no account field".into()))?;

        let info = extract_account(address, account)?;
        tracing::debug!(
            address = %info.address,
            account_number = info.account_number,
            sequence = info.sequence,
            has_pub_key = info.pub_key.is_some(),
            "Resolved account"
        );
        Ok(info)
    }
}

/// Extract an [`AccountInfo`] from the `account` object of a query response.
pub fn extract_account(address: &str, account: &Value) -> TxResult<AccountInfo> {
    let mut current = account;
    for _ in 0..MAX_WRAPPER_DEPTH {
        match WRAPPER_FIELDS
            .iter()
            .find_map(|(snake, camel)| field(current, snake, camel))
        {
            Some(inner) if inner.is_object() => current = inner,
            _ => break,
        }
    }

    let account_number = required_u64(current, "account_number", "accountNumber")?;
    let sequence = required_u64(current, "sequence", "sequence")?;
    let pub_key = field(current, "pub_key", "pubKey").and_then(decode_pub_key);

    Ok(AccountInfo {
        address: field(current, "address", "address")
            .and_then(Value::as_str)
            .unwrap_or(address)
            .to_string(),
        account_number,
        sequence,
        pub_key,
    })
}

fn field<'a>(value: &'a Value, snake: &str, camel: &str) -> Option<&'a Value> {
    value
        .get(snake)
        .or_else(|| value.get(camel))
        .filter(|v| !v.is_null())
}

/// Wire values are decimal strings; plain numbers are tolerated.
fn required_u64(value: &Value, snake: &str, camel: &str) -> TxResult<u64> {
    let malformed = |why: &str| TxError::Transport(format!("account field {}: {}", snake, why));
    match field(value, snake, camel) {
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map_err(|_| malformed(&format!("{:?} is not an unsigned 64-bit integer", s))),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| malformed("not an unsigned 64-bit integer")),
        Some(_) => Err(malformed("unexpected type")),
        None => Err(malformed("missing")),
    }
}

/// Only secp256k1 keys are usable for signing here.
fn decode_pub_key(value: &Value) -> Option<Vec<u8>> {
    let type_url = value.get("@type").and_then(Value::as_str).unwrap_or_default();
    if !type_url.ends_with("secp256k1.PubKey") {
        return None;
    }
    let key = value.get("key").and_then(Value::as_str)?;
    BASE64.decode(key).ok().filter(|bytes| bytes.len() == 33)
}
