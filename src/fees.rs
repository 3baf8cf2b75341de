//! Fee and gas calculation.
//!
//! # Cosmos family
//! `fee = truncate(gas_price × gas_limit)` in the gas price's denomination,
//! attached only when the request supplies both a positive gas limit and a
//! nonzero gas price. Otherwise the transaction carries no fee; minimum-fee
//! enforcement belongs to the chain.
//!
//! # EVM family
//! Gas price resolution is three-tiered (request, node suggestion, default)
//! and lives in the EVM builder; this module holds the pure pieces.

use std::str::FromStr;
use std::sync::LazyLock;

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use regex::Regex;

use crate::error::{TxError, TxResult};
use crate::payload::Coin;

/// Gas price used when neither the request nor a node supplies one (1 gwei).
pub const DEFAULT_GAS_PRICE_WEI: u128 = 1_000_000_000;

/// Intrinsic gas of a value transfer without call data.
pub const TRANSFER_GAS: u64 = 21_000;

/// Extra intrinsic gas per zero / nonzero byte of call data.
const ZERO_BYTE_GAS: u64 = 4;
const NONZERO_BYTE_GAS: u64 = 16;

static GAS_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.?\d*|\.\d+)([A-Za-z][A-Za-z0-9/]*)$").expect("gas price pattern compiles")
});

/// A decimal price per unit of gas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    pub amount: BigDecimal,
    pub denom: String,
}

/// Parse `<decimal><denom>`, e.g. `0.025stake` or `.5uatom`.
pub fn parse_gas_price(raw: &str) -> TxResult<GasPrice> {
    let invalid = || {
        TxError::validation(
            "gasPrice",
            format!("invalid gas price {:?}: expected <decimal><denom> such as 0.025stake", raw),
        )
    };
    let caps = GAS_PRICE_RE.captures(raw).ok_or_else(invalid)?;

    let mut digits = caps[1].to_string();
    if digits.starts_with('.') {
        digits.insert(0, '0');
    }
    if digits.ends_with('.') {
        digits.pop();
    }
    let amount = BigDecimal::from_str(&digits).map_err(|_| invalid())?;

    Ok(GasPrice {
        amount,
        denom: caps[2].to_string(),
    })
}

/// Fee coins for a Cosmos transaction; empty means "no fee".
pub fn cosmos_fee(gas_limit: u64, gas_price: Option<&str>) -> TxResult<Vec<Coin>> {
    let price = match gas_price.map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => parse_gas_price(raw)?,
        None => return Ok(Vec::new()),
    };
    if gas_limit == 0 || price.amount.is_zero() {
        return Ok(Vec::new());
    }

    let total = (price.amount * BigDecimal::from(gas_limit)).with_scale(0);
    let amount = total.to_u128().ok_or_else(|| {
        TxError::validation("gasPrice", format!("fee {} exceeds the supported range", total))
    })?;
    if amount == 0 {
        return Ok(Vec::new());
    }

    Ok(vec![Coin {
        amount,
        denom: price.denom,
    }])
}

/// Parse a requested EVM gas price as an integer amount of wei.
pub fn parse_wei_gas_price(raw: &str) -> TxResult<u128> {
    let raw = raw.trim();
    let digits = raw.strip_suffix("wei").unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TxError::validation(
            "gasPrice",
            format!("invalid gas price {:?}: expected an integer amount of wei", raw),
        ));
    }
    digits.parse::<u128>().map_err(|_| {
        TxError::validation("gasPrice", format!("invalid gas price {:?}: value out of range", raw))
    })
}

/// Intrinsic gas of a plain transfer carrying `data`.
pub fn intrinsic_gas(data: &[u8]) -> u64 {
    data.iter().fold(TRANSFER_GAS, |gas, byte| {
        gas + if *byte == 0 { ZERO_BYTE_GAS } else { NONZERO_BYTE_GAS }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gas_price() {
        let price = parse_gas_price("0.025stake").unwrap();
        assert_eq!(price.amount, BigDecimal::from_str("0.025").unwrap());
        assert_eq!(price.denom, "stake");

        assert_eq!(parse_gas_price(".5uatom").unwrap().amount, BigDecimal::from_str("0.5").unwrap());
        assert_eq!(parse_gas_price("3.stake").unwrap().amount, BigDecimal::from(3));
        assert_eq!(parse_gas_price("10ibc/ABC").unwrap().denom, "ibc/ABC");
    }

    #[test]
    fn test_parse_gas_price_rejections() {
        for raw in ["", "stake", "0.025", "1,5stake", "-1stake", "1.2.3stake"] {
            let err = parse_gas_price(raw).unwrap_err();
            assert!(matches!(err, TxError::Validation { ref field, .. } if field == "gasPrice"));
        }
    }

    #[test]
    fn test_cosmos_fee_truncates() {
        let fee = cosmos_fee(200_000, Some("0.025stake")).unwrap();
        assert_eq!(fee, vec![Coin { amount: 5_000, denom: "stake".into() }]);

        // 0.0333 * 1000 = 33.3 → 33
        let fee = cosmos_fee(1_000, Some("0.0333uatom")).unwrap();
        assert_eq!(fee[0].amount, 33);
    }

    #[test]
    fn test_cosmos_fee_absent() {
        assert!(cosmos_fee(0, Some("0.025stake")).unwrap().is_empty());
        assert!(cosmos_fee(200_000, None).unwrap().is_empty());
        assert!(cosmos_fee(200_000, Some("")).unwrap().is_empty());
        assert!(cosmos_fee(200_000, Some("0stake")).unwrap().is_empty());
        assert!(cosmos_fee(1, Some("0.1stake")).unwrap().is_empty());
    }

    #[test]
    fn test_cosmos_fee_rejects_bad_price() {
        assert!(cosmos_fee(200_000, Some("cheap")).is_err());
    }

    #[test]
    fn test_wei_gas_price() {
        assert_eq!(parse_wei_gas_price("2000000000").unwrap(), 2_000_000_000);
        assert_eq!(parse_wei_gas_price("7wei").unwrap(), 7);
        assert!(parse_wei_gas_price("1.5").is_err());
        assert!(parse_wei_gas_price("1gwei").is_err());
    }

    #[test]
    fn test_intrinsic_gas() {
        assert_eq!(intrinsic_gas(&[]), 21_000);
        assert_eq!(intrinsic_gas(&[0, 1, 2]), 21_000 + 4 + 16 + 16);
    }
}
