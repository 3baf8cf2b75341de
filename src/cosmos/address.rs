//! Bech32 address codec owned by each Cosmos builder.
//!
//! Two builders for chains with different prefixes can live in one process;
//! nothing here is global.

use bech32::Hrp;

use crate::error::{TxError, TxResult};

/// Account and validator-operator prefixes for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCodec {
    account_prefix: String,
    validator_prefix: String,
}

impl AddressCodec {
    /// Create a codec; both prefixes must be valid bech32 human-readable parts.
    pub fn new(account_prefix: &str, validator_prefix: &str) -> TxResult<Self> {
        for prefix in [account_prefix, validator_prefix] {
            Hrp::parse(prefix).map_err(|e| {
                TxError::Configuration(format!("invalid bech32 prefix {:?}: {}", prefix, e))
            })?;
        }
        Ok(Self {
            account_prefix: account_prefix.to_string(),
            validator_prefix: validator_prefix.to_string(),
        })
    }

    /// Codec using the `<prefix>valoper` convention.
    pub fn with_account_prefix(account_prefix: &str) -> TxResult<Self> {
        Self::new(account_prefix, &format!("{}valoper", account_prefix))
    }

    pub fn account_prefix(&self) -> &str {
        &self.account_prefix
    }

    pub fn validator_prefix(&self) -> &str {
        &self.validator_prefix
    }

    /// Check that `address` is a bech32 account address for this chain.
    pub fn check_account(&self, field: &str, address: &str) -> TxResult<()> {
        check(field, address, &self.account_prefix)
    }

    /// Check that `address` is a bech32 validator operator address for this chain.
    pub fn check_validator(&self, field: &str, address: &str) -> TxResult<()> {
        check(field, address, &self.validator_prefix)
    }
}

fn check(field: &str, address: &str, prefix: &str) -> TxResult<()> {
    let invalid = || {
        TxError::validation(
            field,
            format!(
                "invalid address {:?}: expected bech32 address with prefix {}",
                address, prefix
            ),
        )
    };

    let (hrp, data) = bech32::decode(address).map_err(|_| invalid())?;
    if hrp.as_str() != prefix || data.is_empty() || data.len() > 255 {
        return Err(invalid());
    }
    Ok(())
}
