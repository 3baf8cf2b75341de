//! Protobuf transaction assembly and SIGN_MODE_DIRECT sign-bytes.
//!
//! The reference encoding is a `TxRaw` with no signatures. The sign-bytes
//! are a separately encoded `SignDoc` binding body, auth info, chain id and
//! account number.

use cosmos_sdk_proto::cosmos::authz::v1beta1::{GenericAuthorization, Grant, MsgGrant};
use cosmos_sdk_proto::cosmos::bank::v1beta1::MsgSend;
use cosmos_sdk_proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use cosmos_sdk_proto::cosmos::crypto::secp256k1::PubKey;
use cosmos_sdk_proto::cosmos::feegrant::v1beta1::{BasicAllowance, MsgGrantAllowance};
use cosmos_sdk_proto::cosmos::gov::{v1 as gov_v1, v1beta1 as gov_v1beta1};
use cosmos_sdk_proto::cosmos::staking::v1beta1::MsgDelegate;
use cosmos_sdk_proto::cosmos::tx::signing::v1beta1::SignMode;
use cosmos_sdk_proto::cosmos::tx::v1beta1::{
    mode_info, AuthInfo, Fee, ModeInfo, SignDoc, SignerInfo, TxBody, TxRaw,
};
use cosmos_sdk_proto::Any;
use prost::Message;

use crate::error::{TxError, TxResult};
use crate::payload::{Coin, CosmosMsg};

pub const MSG_VOTE_V1BETA1: &str = "/cosmos.gov.v1beta1.MsgVote";
pub const MSG_VOTE_V1: &str = "/cosmos.gov.v1.MsgVote";
pub const MSG_SEND: &str = "/cosmos.bank.v1beta1.MsgSend";
pub const MSG_DELEGATE: &str = "/cosmos.staking.v1beta1.MsgDelegate";
pub const MSG_GRANT: &str = "/cosmos.authz.v1beta1.MsgGrant";
pub const GENERIC_AUTHORIZATION: &str = "/cosmos.authz.v1beta1.GenericAuthorization";
pub const MSG_GRANT_ALLOWANCE: &str = "/cosmos.feegrant.v1beta1.MsgGrantAllowance";
pub const BASIC_ALLOWANCE: &str = "/cosmos.feegrant.v1beta1.BasicAllowance";
pub const SECP256K1_PUB_KEY: &str = "/cosmos.crypto.secp256k1.PubKey";

fn to_any<M: Message>(type_url: &str, msg: &M) -> Any {
    Any {
        type_url: type_url.to_string(),
        value: msg.encode_to_vec(),
    }
}

fn proto_coins(coins: &[Coin]) -> Vec<ProtoCoin> {
    coins.iter().map(ProtoCoin::from).collect()
}

/// Pack a validated message. `gov_v1` selects the v1 governance vote.
pub fn encode_message(msg: &CosmosMsg, gov_v1: bool) -> Any {
    match msg {
        CosmosMsg::Vote {
            voter,
            proposal_id,
            option,
        } if gov_v1 => to_any(
            MSG_VOTE_V1,
            &gov_v1::MsgVote {
                proposal_id: *proposal_id,
                voter: voter.clone(),
                option: option.proto_value(),
                metadata: String::new(),
            },
        ),
        CosmosMsg::Vote {
            voter,
            proposal_id,
            option,
        } => to_any(
            MSG_VOTE_V1BETA1,
            &gov_v1beta1::MsgVote {
                proposal_id: *proposal_id,
                voter: voter.clone(),
                option: option.proto_value(),
            },
        ),
        CosmosMsg::Send {
            from_address,
            to_address,
            amount,
        } => to_any(
            MSG_SEND,
            &MsgSend {
                from_address: from_address.clone(),
                to_address: to_address.clone(),
                amount: vec![amount.into()],
            },
        ),
        CosmosMsg::Delegate {
            delegator_address,
            validator_address,
            amount,
        } => to_any(
            MSG_DELEGATE,
            &MsgDelegate {
                delegator_address: delegator_address.clone(),
                validator_address: validator_address.clone(),
                amount: Some(amount.into()),
            },
        ),
        CosmosMsg::AuthzGrant {
            granter,
            grantee,
            msg_type_url,
        } => to_any(
            MSG_GRANT,
            &MsgGrant {
                granter: granter.clone(),
                grantee: grantee.clone(),
                grant: Some(Grant {
                    authorization: Some(to_any(
                        GENERIC_AUTHORIZATION,
                        &GenericAuthorization {
                            msg: msg_type_url.clone(),
                        },
                    )),
                    expiration: None,
                }),
            },
        ),
        CosmosMsg::FeegrantAllowance {
            granter,
            grantee,
            spend_limit,
        } => to_any(
            MSG_GRANT_ALLOWANCE,
            &MsgGrantAllowance {
                granter: granter.clone(),
                grantee: grantee.clone(),
                allowance: Some(to_any(
                    BASIC_ALLOWANCE,
                    &BasicAllowance {
                        spend_limit: proto_coins(spend_limit),
                        expiration: None,
                    },
                )),
            },
        ),
    }
}

/// Inputs for one unsigned transaction.
#[derive(Debug, Clone)]
pub struct TxParts<'a> {
    pub messages: Vec<Any>,
    pub memo: &'a str,
    pub fee: &'a [Coin],
    pub gas_limit: u64,
    /// Compressed secp256k1 key placed in the signer info, when known.
    pub pub_key: Option<&'a [u8]>,
    pub sequence: u64,
}

/// Encoded body and auth info of an unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedParts {
    pub body_bytes: Vec<u8>,
    pub auth_info_bytes: Vec<u8>,
}

impl EncodedParts {
    /// Reference encoding: a `TxRaw` with no signatures.
    pub fn tx_raw_bytes(&self) -> Vec<u8> {
        TxRaw {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            signatures: Vec::new(),
        }
        .encode_to_vec()
    }

    /// Canonical SIGN_MODE_DIRECT bytes.
    pub fn sign_doc_bytes(&self, chain_id: &str, account_number: u64) -> Vec<u8> {
        SignDoc {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            chain_id: chain_id.to_string(),
            account_number,
        }
        .encode_to_vec()
    }
}

/// Encode body and auth info. The single signer info uses direct mode.
pub fn encode_parts(parts: &TxParts<'_>) -> EncodedParts {
    let body = TxBody {
        messages: parts.messages.clone(),
        memo: parts.memo.to_string(),
        ..Default::default()
    };

    let signer_info = SignerInfo {
        public_key: parts
            .pub_key
            .map(|key| to_any(SECP256K1_PUB_KEY, &PubKey { key: key.to_vec() })),
        mode_info: Some(ModeInfo {
            sum: Some(mode_info::Sum::Single(mode_info::Single {
                mode: SignMode::Direct as i32,
            })),
        }),
        sequence: parts.sequence,
    };

    let auth_info = AuthInfo {
        signer_infos: vec![signer_info],
        fee: Some(Fee {
            amount: proto_coins(parts.fee),
            gas_limit: parts.gas_limit,
            ..Default::default()
        }),
        ..Default::default()
    };

    EncodedParts {
        body_bytes: body.encode_to_vec(),
        auth_info_bytes: auth_info.encode_to_vec(),
    }
}

pub fn decode_tx_raw(bytes: &[u8]) -> TxResult<TxRaw> {
    TxRaw::decode(bytes).map_err(|e| TxError::Encoding(format!("invalid TxRaw: {}", e)))
}

pub fn decode_auth_info(bytes: &[u8]) -> TxResult<AuthInfo> {
    AuthInfo::decode(bytes).map_err(|e| TxError::Encoding(format!("invalid AuthInfo: {}", e)))
}

pub fn decode_body(bytes: &[u8]) -> TxResult<TxBody> {
    TxBody::decode(bytes).map_err(|e| TxError::Encoding(format!("invalid TxBody: {}", e)))
}

/// Compressed public key carried by a signer info, if any.
pub fn signer_pub_key(info: &SignerInfo) -> TxResult<Option<Vec<u8>>> {
    match &info.public_key {
        None => Ok(None),
        Some(any) if any.type_url == SECP256K1_PUB_KEY => PubKey::decode(any.value.as_slice())
            .map(|pk| Some(pk.key))
            .map_err(|e| TxError::Encoding(format!("invalid signer public key: {}", e))),
        Some(any) => Err(TxError::Encoding(format!(
            "unsupported signer key type {}",
            any.type_url
        ))),
    }
}
