//! Key loading and EIP-155 transaction signing.
//!
//! # Security
//! - Keys arrive as raw bytes and are dropped after each call
//! - Keys are never logged or serialized

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::error::{TxError, TxResult};
use crate::evm::encoder::{decode_unsigned, encode_signed, signing_hash};
use crate::types::{SignedTx, SigningKey, UnsignedTx};

/// Parse a raw 32-byte private key.
pub fn load_signer(priv_key: &[u8]) -> TxResult<PrivateKeySigner> {
    if priv_key.is_empty() {
        return Err(TxError::Signing("private key required".to_string()));
    }
    if priv_key.len() != 32 {
        return Err(TxError::Signing(format!(
            "private key length mismatch: expected 32 bytes, got {}",
            priv_key.len()
        )));
    }
    PrivateKeySigner::from_slice(priv_key)
        .map_err(|e| TxError::Signing(format!("Invalid private key format: {}", e)))
}

/// Sign an unsigned legacy transaction.
///
/// Preconditions are checked in order, each with its own message, before
/// any cryptographic call: unsigned bytes, sign-doc, private key.
pub fn sign_tx(unsigned: &UnsignedTx, key: &SigningKey) -> TxResult<SignedTx> {
    if unsigned.tx_bytes.is_empty() {
        return Err(TxError::Signing("unsigned transaction is empty".to_string()));
    }
    if unsigned.sign_doc.is_empty() {
        return Err(TxError::Signing("sign doc is empty".to_string()));
    }
    if key.priv_key.is_empty() {
        return Err(TxError::Signing("private key required".to_string()));
    }
    if unsigned.sign_doc.len() != 32 {
        return Err(TxError::Signing(format!(
            "sign doc must be a 32-byte hash, got {} bytes",
            unsigned.sign_doc.len()
        )));
    }

    let tx = decode_unsigned(&unsigned.tx_bytes)?;
    let hash = B256::from_slice(&unsigned.sign_doc);
    if signing_hash(&tx) != hash {
        return Err(TxError::Signing(
            "sign doc does not match the unsigned transaction".to_string(),
        ));
    }

    let signer = load_signer(&key.priv_key)?;
    let signature = signer
        .sign_hash_sync(&hash)
        .map_err(|e| TxError::Signing(format!("Signing failed: {}", e)))?;
    if signature.r().is_zero() || signature.s().is_zero() {
        return Err(TxError::Signing("signature has a zero component".to_string()));
    }

    let nonce = tx.nonce;
    let tx_bytes = encode_signed(tx, signature);

    tracing::debug!(
        signer = %signer.address(),
        nonce,
        "Signed EVM transaction"
    );

    Ok(SignedTx {
        tx_bytes,
        signature: signature.as_bytes().to_vec(),
        pub_key: signer
            .credential()
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec(),
    })
}
