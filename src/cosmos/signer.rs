//! secp256k1 key handling and SIGN_MODE_DIRECT signature attachment.
//!
//! Signing is pure: no I/O, no clock. The same key over the same sign-doc
//! always yields the same 64-byte `r || s` signature (RFC 6979 nonces,
//! low-S normalized).

use cosmos_sdk_proto::cosmos::tx::v1beta1::{SignDoc, TxRaw};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey as EcdsaKey, VerifyingKey};
use prost::Message;

use crate::cosmos::encoder::{decode_auth_info, decode_tx_raw, signer_pub_key};
use crate::error::{TxError, TxResult};
use crate::types::{SignedTx, SigningKey, UnsignedTx};

const PRIVATE_KEY_LEN: usize = 32;

/// Load a raw private key. Length is checked before any curve operation.
pub fn load_key(priv_key: &[u8]) -> TxResult<EcdsaKey> {
    if priv_key.is_empty() {
        return Err(TxError::Signing("private key required".to_string()));
    }
    if priv_key.len() != PRIVATE_KEY_LEN {
        return Err(TxError::Signing(format!(
            "private key length mismatch: expected {} bytes, got {}",
            PRIVATE_KEY_LEN,
            priv_key.len()
        )));
    }
    EcdsaKey::from_slice(priv_key)
        .map_err(|e| TxError::Signing(format!("invalid secp256k1 private key: {}", e)))
}

/// Compressed SEC1 public key (33 bytes).
pub fn compressed_pub_key(key: &EcdsaKey) -> Vec<u8> {
    key.verifying_key().to_encoded_point(true).as_bytes().to_vec()
}

/// Deterministic ECDSA over SHA-256(`doc`).
pub fn sign_bytes(key: &EcdsaKey, doc: &[u8]) -> Vec<u8> {
    let signature: Signature = key.sign(doc);
    let signature = signature.normalize_s().unwrap_or(signature);
    signature.to_bytes().to_vec()
}

/// Check a 64-byte signature over `doc` against a compressed public key.
pub fn verify(pub_key: &[u8], doc: &[u8], signature: &[u8]) -> bool {
    let Ok(key) = VerifyingKey::from_sec1_bytes(pub_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(doc, &signature).is_ok()
}

/// Sign `unsigned.sign_doc` and attach exactly one signature.
///
/// The auth info is taken as built: if it already names a signer key, that
/// key must belong to `key`, otherwise the signature would not verify.
pub fn sign_tx(unsigned: &UnsignedTx, key: &SigningKey) -> TxResult<SignedTx> {
    if unsigned.tx_bytes.is_empty() {
        return Err(TxError::Signing("unsigned transaction is empty".to_string()));
    }
    if unsigned.sign_doc.is_empty() {
        return Err(TxError::Signing("sign doc is empty".to_string()));
    }
    let ecdsa = load_key(&key.priv_key)?;
    let pub_key = compressed_pub_key(&ecdsa);

    let mut raw: TxRaw = decode_tx_raw(&unsigned.tx_bytes)?;
    if !raw.signatures.is_empty() {
        return Err(TxError::Signing("transaction is already signed".to_string()));
    }

    let doc = SignDoc::decode(unsigned.sign_doc.as_slice())
        .map_err(|e| TxError::Encoding(format!("invalid sign doc: {}", e)))?;
    if doc.body_bytes != raw.body_bytes || doc.auth_info_bytes != raw.auth_info_bytes {
        return Err(TxError::Signing(
            "sign doc does not match the unsigned transaction".to_string(),
        ));
    }
    if doc.account_number != unsigned.account_number {
        return Err(TxError::Signing(format!(
            "sign doc account number {} does not match {}",
            doc.account_number, unsigned.account_number
        )));
    }

    let auth_info = decode_auth_info(&raw.auth_info_bytes)?;
    let [signer] = auth_info.signer_infos.as_slice() else {
        return Err(TxError::Encoding(format!(
            "expected exactly one signer info, found {}",
            auth_info.signer_infos.len()
        )));
    };
    if signer.sequence != unsigned.sequence {
        return Err(TxError::Signing(format!(
            "signer sequence {} does not match {}",
            signer.sequence, unsigned.sequence
        )));
    }
    if let Some(declared) = signer_pub_key(signer)? {
        if declared != pub_key {
            return Err(TxError::Signing(
                "private key does not match the public key in the transaction".to_string(),
            ));
        }
    }

    let signature = sign_bytes(&ecdsa, &unsigned.sign_doc);
    raw.signatures.push(signature.clone());

    tracing::debug!(
        signer = %key.address,
        sequence = unsigned.sequence,
        "Signed Cosmos transaction"
    );

    Ok(SignedTx {
        tx_bytes: raw.encode_to_vec(),
        signature,
        pub_key,
    })
}
