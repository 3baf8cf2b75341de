//! EVM-family payload: native value transfer.

use alloy::primitives::{Address, Bytes, U256};
use serde_json::Value;

use crate::error::{TxError, TxResult};
use crate::payload::Fields;
use crate::types::TxType;

/// A validated native transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmTransfer {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Validate `payload` for `tx_type`.
pub fn parse_transfer(tx_type: TxType, payload: &Value) -> TxResult<EvmTransfer> {
    if tx_type != TxType::NativeTransfer {
        return Err(TxError::UnsupportedTxType(tx_type.to_string()));
    }

    let fields = Fields::new(payload)?;
    let to = parse_address("toAddress", fields.required_str("toAddress")?)?;
    let value = parse_wei("amount", fields.required_str("amount")?)?;
    let data = match fields.optional_str("data")? {
        Some(raw) => parse_data("data", raw)?,
        None => Bytes::new(),
    };

    Ok(EvmTransfer { to, value, data })
}

/// A 20-byte hex address, `0x`-prefixed.
pub fn parse_address(field: &str, raw: &str) -> TxResult<Address> {
    let invalid = || {
        TxError::validation(
            field,
            format!("invalid address {:?}: expected 0x-prefixed 20-byte hex address", raw),
        )
    };
    let digits = raw.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    raw.parse::<Address>().map_err(|_| invalid())
}

/// A non-negative base-10 integer amount of wei.
pub fn parse_wei(field: &str, raw: &str) -> TxResult<U256> {
    let invalid = |why: &str| {
        TxError::validation(
            field,
            format!("invalid amount {:?}: expected non-negative base-10 wei integer{}", raw, why),
        )
    };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(""));
    }
    U256::from_str_radix(raw, 10).map_err(|_| invalid(" (exceeds 256 bits)"))
}

/// Optional call data, `0x`-prefixed hex.
pub fn parse_data(field: &str, raw: &str) -> TxResult<Bytes> {
    let invalid = || {
        TxError::validation(
            field,
            format!("invalid data {:?}: expected 0x-prefixed hex", raw),
        )
    };
    let digits = raw.strip_prefix("0x").ok_or_else(invalid)?;
    hex::decode(digits).map(Bytes::from).map_err(|_| invalid())
}
