//! Data model shared by both framework families.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TxError;

/// Framework family a builder speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// Tendermint/CometBFT chains with protobuf transactions.
    Cosmos,
    /// EVM chains with RLP transactions.
    Evm,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Cosmos => "cosmos",
            Framework::Evm => "evm",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical transaction intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TxType {
    GovVote,
    BankSend,
    StakingDelegate,
    AuthzGrant,
    FeegrantAllowance,
    NativeTransfer,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::GovVote => "gov_vote",
            TxType::BankSend => "bank_send",
            TxType::StakingDelegate => "staking_delegate",
            TxType::AuthzGrant => "authz_grant",
            TxType::FeegrantAllowance => "feegrant_allowance",
            TxType::NativeTransfer => "native_transfer",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gov_vote" => Ok(TxType::GovVote),
            "bank_send" => Ok(TxType::BankSend),
            "staking_delegate" => Ok(TxType::StakingDelegate),
            "authz_grant" => Ok(TxType::AuthzGrant),
            "feegrant_allowance" => Ok(TxType::FeegrantAllowance),
            "native_transfer" => Ok(TxType::NativeTransfer),
            other => Err(TxError::UnsupportedTxType(other.to_string())),
        }
    }
}

/// Optional chain capability, derived from the node's application version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Authz,
    Feegrant,
    GovV1,
    Group,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Authz => "authz",
            Feature::Feegrant => "feegrant",
            Feature::GovV1 => "gov-v1",
            Feature::Group => "group",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected or declared application version of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkVersion {
    pub framework: Framework,
    pub version: String,
    pub features: BTreeSet<Feature>,
}

impl SdkVersion {
    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}

/// A caller-constructed request to build one transaction.
#[derive(Debug, Clone)]
pub struct TxBuildRequest {
    pub tx_type: TxType,
    /// Sender address in the framework's native format.
    pub sender: String,
    /// Empty means "the builder's chain".
    pub chain_id: String,
    pub payload: serde_json::Value,
    /// Zero means "use the framework default".
    pub gas_limit: u64,
    pub gas_price: Option<String>,
    pub memo: String,
    /// Compressed secp256k1 public key of the signer (Cosmos family only).
    ///
    /// Falls back to the key stored on-chain. A fresh account has none, so
    /// set this for an account's first transaction: without any key the
    /// signer info carries no public key and the node rejects the result.
    pub pub_key: Option<Vec<u8>>,
}

impl TxBuildRequest {
    pub fn new(tx_type: TxType, sender: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            tx_type,
            sender: sender.into(),
            chain_id: String::new(),
            payload,
            gas_limit: 0,
            gas_price: None,
            memo: String::new(),
            pub_key: None,
        }
    }

    pub fn with_gas(mut self, gas_limit: u64, gas_price: impl Into<String>) -> Self {
        self.gas_limit = gas_limit;
        self.gas_price = Some(gas_price.into());
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_pub_key(mut self, pub_key: Vec<u8>) -> Self {
        self.pub_key = Some(pub_key);
        self
    }
}

/// An encoded transaction awaiting its signature.
///
/// `sign_doc` is the only byte sequence that may be signed. `tx_bytes` is a
/// reference encoding that the signer decodes and re-encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub tx_bytes: Vec<u8>,
    pub sign_doc: Vec<u8>,
    pub account_number: u64,
    pub sequence: u64,
}

/// A transaction carrying exactly one signature, ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub tx_bytes: Vec<u8>,
    pub signature: Vec<u8>,
    pub pub_key: Vec<u8>,
}

/// Raw private key material for one signer.
#[derive(Clone)]
pub struct SigningKey {
    pub address: String,
    pub priv_key: Vec<u8>,
}

impl SigningKey {
    pub fn new(address: impl Into<String>, priv_key: Vec<u8>) -> Self {
        Self {
            address: address.into(),
            priv_key,
        }
    }

    /// Parse a hex private key (with or without 0x prefix).
    pub fn from_hex(address: impl Into<String>, key_hex: &str) -> Result<Self, TxError> {
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let priv_key = hex::decode(key_hex)
            .map_err(|e| TxError::Signing(format!("Invalid private key format: {}", e)))?;
        Ok(Self::new(address, priv_key))
    }
}

// Key bytes stay out of logs.
impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("address", &self.address)
            .field("priv_key", &"<redacted>")
            .finish()
    }
}

/// Normalized outcome of a broadcast.
///
/// `code == 0` means the node accepted the transaction into its mempool;
/// a nonzero code is an application-level rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxBroadcastResult {
    pub tx_hash: String,
    pub code: i64,
    pub log: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

impl TxBroadcastResult {
    pub fn is_accepted(&self) -> bool {
        self.code == 0
    }
}

/// Snapshot of a signer account read from chain state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    pub account_number: u64,
    pub sequence: u64,
    pub pub_key: Option<Vec<u8>>,
}
