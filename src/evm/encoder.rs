//! Legacy (pre-fee-market) transaction encoding with EIP-155 replay protection.
//!
//! The unsigned reference encoding is the EIP-155 signing payload
//! `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`; the
//! sign-doc is its keccak256. The signed encoding is the standard
//! `rlp([..., v, r, s])`.

use alloy::consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::{Decodable2718, Encodable2718};
use alloy::primitives::{keccak256, Bytes, Signature, TxKind, B256, U256};
use alloy::rlp::{Decodable, Header};

use crate::error::{TxError, TxResult};
use crate::payload::EvmTransfer;

/// Assemble a legacy transfer bound to `chain_id`.
pub fn legacy_transfer(
    transfer: &EvmTransfer,
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    chain_id: u64,
) -> TxLegacy {
    TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price,
        gas_limit,
        to: TxKind::Call(transfer.to),
        value: transfer.value,
        input: transfer.data.clone(),
    }
}

/// Reference bytes for an unsigned transaction.
pub fn encode_unsigned(tx: &TxLegacy) -> Vec<u8> {
    tx.encoded_for_signing()
}

/// The 32-byte chain-bound signing hash.
pub fn signing_hash(tx: &TxLegacy) -> B256 {
    tx.signature_hash()
}

fn malformed(what: impl std::fmt::Display) -> TxError {
    TxError::Encoding(format!("invalid unsigned legacy transaction: {}", what))
}

/// Decode bytes produced by [`encode_unsigned`].
///
/// Only the EIP-155 form is accepted: a chain id followed by two empty
/// fields, with nothing after the list.
pub fn decode_unsigned(bytes: &[u8]) -> TxResult<TxLegacy> {
    let mut buf = bytes;
    let header = Header::decode(&mut buf).map_err(malformed)?;
    if !header.list {
        return Err(malformed("expected an RLP list"));
    }
    if header.payload_length != buf.len() {
        return Err(malformed("length prefix does not match the payload"));
    }

    let nonce = u64::decode(&mut buf).map_err(malformed)?;
    let gas_price = u128::decode(&mut buf).map_err(malformed)?;
    let gas_limit = u64::decode(&mut buf).map_err(malformed)?;
    let to = TxKind::decode(&mut buf).map_err(malformed)?;
    let value = U256::decode(&mut buf).map_err(malformed)?;
    let input = Bytes::decode(&mut buf).map_err(malformed)?;
    let chain_id = u64::decode(&mut buf).map_err(malformed)?;
    let r = u64::decode(&mut buf).map_err(malformed)?;
    let s = u64::decode(&mut buf).map_err(malformed)?;

    if r != 0 || s != 0 {
        return Err(malformed("EIP-155 trailer must be (chainId, 0, 0)"));
    }
    if !buf.is_empty() {
        return Err(malformed("trailing bytes"));
    }

    Ok(TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price,
        gas_limit,
        to,
        value,
        input,
    })
}

/// Attach `signature` and produce the broadcastable encoding.
pub fn encode_signed(tx: TxLegacy, signature: Signature) -> Vec<u8> {
    TxEnvelope::Legacy(tx.into_signed(signature)).encoded_2718()
}

/// Decode a signed legacy transaction.
pub fn decode_signed(bytes: &[u8]) -> TxResult<Signed<TxLegacy>> {
    let mut buf = bytes;
    let envelope = TxEnvelope::decode_2718(&mut buf)
        .map_err(|e| TxError::Encoding(format!("invalid signed transaction: {}", e)))?;
    if !buf.is_empty() {
        return Err(TxError::Encoding("invalid signed transaction: trailing bytes".to_string()));
    }
    match envelope {
        TxEnvelope::Legacy(signed) => Ok(signed),
        other => Err(TxError::Encoding(format!(
            "expected a legacy transaction, found type {:?}",
            other.tx_type()
        ))),
    }
}

/// Hash of signed bytes as a 0x-prefixed hex string.
pub fn tx_hash(signed_bytes: &[u8]) -> String {
    keccak256(signed_bytes).to_string()
}
