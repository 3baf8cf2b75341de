//! Payload validation and message factory.
//!
//! # Data Flow
//! ```text
//! (framework, tx type, JSON payload)
//!     → cosmos.rs / evm.rs (field extraction, grammar checks)
//!     → typed message (CosmosMsg / EvmTransfer)
//! ```
//!
//! Every failure is a [`TxError::Validation`] naming the offending field
//! and the expected shape. The reason strings are stable and asserted
//! verbatim in tests.

pub mod cosmos;
pub mod evm;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{TxError, TxResult};

pub use cosmos::{parse_vote_option, CosmosMsg, VoteOption};
pub use evm::EvmTransfer;

static COIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)([A-Za-z][A-Za-z0-9/]*)$").expect("coin pattern compiles")
});

/// An integral amount of one denomination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    pub amount: u128,
    pub denom: String,
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl From<&Coin> for cosmos_sdk_proto::cosmos::base::v1beta1::Coin {
    fn from(coin: &Coin) -> Self {
        Self {
            denom: coin.denom.clone(),
            amount: coin.amount.to_string(),
        }
    }
}

/// Parse `<digits><denom>` into a strictly positive [`Coin`].
///
/// Decimal points and zero amounts are rejected: amounts are always
/// integral smallest-unit values.
pub fn parse_coin(field: &str, raw: &str) -> TxResult<Coin> {
    let caps = COIN_RE.captures(raw).ok_or_else(|| {
        TxError::validation(
            field,
            format!("invalid amount {:?}: expected <integer><denom> such as 1000stake", raw),
        )
    })?;

    let amount: u128 = caps[1].parse().map_err(|_| {
        TxError::validation(field, format!("invalid amount {:?}: value out of range", raw))
    })?;
    if amount == 0 {
        return Err(TxError::validation(
            field,
            format!("invalid amount {:?}: must be greater than zero", raw),
        ));
    }

    Ok(Coin {
        amount,
        denom: caps[2].to_string(),
    })
}

/// Borrowed view over a payload object with field-level error reporting.
pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(payload: &'a Value) -> TxResult<Self> {
        payload
            .as_object()
            .map(|map| Self { map })
            .ok_or_else(|| TxError::validation("payload", "expected a JSON object"))
    }

    pub(crate) fn required_str(&self, field: &str) -> TxResult<&'a str> {
        match self.map.get(field) {
            None | Some(Value::Null) => Err(TxError::validation(field, "is required")),
            Some(Value::String(s)) if s.trim().is_empty() => {
                Err(TxError::validation(field, "is required"))
            }
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(TxError::validation(field, "expected a string")),
        }
    }

    pub(crate) fn optional_str(&self, field: &str) -> TxResult<Option<&'a str>> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(TxError::validation(field, "expected a string")),
        }
    }

    /// A `uint64`, given either as a JSON number or a decimal string.
    pub(crate) fn required_u64(&self, field: &str) -> TxResult<u64> {
        let invalid = || TxError::validation(field, "expected an unsigned 64-bit integer");
        match self.map.get(field) {
            None | Some(Value::Null) => Err(TxError::validation(field, "is required")),
            Some(Value::Number(n)) => n.as_u64().ok_or_else(invalid),
            Some(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_coin() {
        let coin = parse_coin("amount", "1000stake").unwrap();
        assert_eq!(coin.amount, 1000);
        assert_eq!(coin.denom, "stake");

        let ibc = parse_coin("amount", "5ibc/27394FB092D2ECCD").unwrap();
        assert_eq!(ibc.denom, "ibc/27394FB092D2ECCD");
    }

    #[test]
    fn test_parse_coin_rejections() {
        for raw in ["", "stake", "1000.5stake", "0stake", "000stake", "-5stake", "10 stake"] {
            let err = parse_coin("amount", raw).unwrap_err();
            assert!(
                matches!(err, TxError::Validation { ref field, .. } if field == "amount"),
                "{:?} should be rejected",
                raw
            );
        }

        assert_eq!(
            parse_coin("amount", "1000.5stake").unwrap_err().to_string(),
            "invalid amount: invalid amount \"1000.5stake\": expected <integer><denom> such as 1000stake"
        );
        assert_eq!(
            parse_coin("amount", "0stake").unwrap_err().to_string(),
            "invalid amount: invalid amount \"0stake\": must be greater than zero"
        );
    }

    #[test]
    fn test_fields() {
        let payload = json!({"id": "17", "n": 3, "s": "x", "bad": true});
        let fields = Fields::new(&payload).unwrap();
        assert_eq!(fields.required_u64("id").unwrap(), 17);
        assert_eq!(fields.required_u64("n").unwrap(), 3);
        assert_eq!(fields.required_str("s").unwrap(), "x");
        assert_eq!(fields.optional_str("missing").unwrap(), None);
        assert_eq!(
            fields.required_str("bad").unwrap_err().to_string(),
            "invalid bad: expected a string"
        );
        assert_eq!(
            fields.required_str("missing").unwrap_err().to_string(),
            "invalid missing: is required"
        );

        let err = Fields::new(&json!([1, 2])).err().unwrap();
        assert_eq!(err.to_string(), "invalid payload: expected a JSON object");
    }
}
