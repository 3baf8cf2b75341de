//! Cosmos-family payloads: governance vote, bank send, staking delegate,
//! authz grant and fee allowance.

use serde_json::Value;

use crate::cosmos::address::AddressCodec;
use crate::error::{TxError, TxResult};
use crate::payload::{parse_coin, Coin, Fields};
use crate::types::TxType;

/// Canonical governance vote options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteOption {
    Yes,
    No,
    Abstain,
    NoWithVeto,
}

impl VoteOption {
    /// Protobuf enum value, identical in gov v1beta1 and v1.
    pub fn proto_value(self) -> i32 {
        match self {
            VoteOption::Yes => 1,
            VoteOption::Abstain => 2,
            VoteOption::No => 3,
            VoteOption::NoWithVeto => 4,
        }
    }
}

/// Parse a vote option case-insensitively; `nowithveto` is a synonym for `no_with_veto`.
pub fn parse_vote_option(raw: &str) -> TxResult<VoteOption> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" => Ok(VoteOption::Yes),
        "no" => Ok(VoteOption::No),
        "abstain" => Ok(VoteOption::Abstain),
        "no_with_veto" | "nowithveto" => Ok(VoteOption::NoWithVeto),
        _ => Err(TxError::validation(
            "option",
            format!(
                "invalid vote option {:?}: expected yes, no, abstain or no_with_veto",
                raw
            ),
        )),
    }
}

/// A validated Cosmos message, with the sender already attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosmosMsg {
    Vote {
        voter: String,
        proposal_id: u64,
        option: VoteOption,
    },
    Send {
        from_address: String,
        to_address: String,
        amount: Coin,
    },
    Delegate {
        delegator_address: String,
        validator_address: String,
        amount: Coin,
    },
    AuthzGrant {
        granter: String,
        grantee: String,
        msg_type_url: String,
    },
    FeegrantAllowance {
        granter: String,
        grantee: String,
        spend_limit: Vec<Coin>,
    },
}

/// Validate `payload` for `tx_type` and build the message signed by `sender`.
pub fn parse_message(
    tx_type: TxType,
    sender: &str,
    payload: &Value,
    codec: &AddressCodec,
) -> TxResult<CosmosMsg> {
    let fields = Fields::new(payload)?;

    match tx_type {
        TxType::GovVote => {
            let proposal_id = fields.required_u64("proposalId")?;
            let option = parse_vote_option(fields.required_str("option")?)?;
            Ok(CosmosMsg::Vote {
                voter: sender.to_string(),
                proposal_id,
                option,
            })
        }
        TxType::BankSend => {
            let to_address = fields.required_str("toAddress")?;
            codec.check_account("toAddress", to_address)?;
            let amount = parse_coin("amount", fields.required_str("amount")?)?;
            Ok(CosmosMsg::Send {
                from_address: sender.to_string(),
                to_address: to_address.to_string(),
                amount,
            })
        }
        TxType::StakingDelegate => {
            let validator_address = fields.required_str("validatorAddress")?;
            codec.check_validator("validatorAddress", validator_address)?;
            let amount = parse_coin("amount", fields.required_str("amount")?)?;
            Ok(CosmosMsg::Delegate {
                delegator_address: sender.to_string(),
                validator_address: validator_address.to_string(),
                amount,
            })
        }
        TxType::AuthzGrant => {
            let grantee = fields.required_str("granteeAddress")?;
            codec.check_account("granteeAddress", grantee)?;
            let msg_type_url = fields.required_str("msgTypeUrl")?;
            if !msg_type_url.starts_with('/') || msg_type_url.len() < 2 {
                return Err(TxError::validation(
                    "msgTypeUrl",
                    format!(
                        "invalid message type URL {:?}: expected a type URL such as /cosmos.bank.v1beta1.MsgSend",
                        msg_type_url
                    ),
                ));
            }
            Ok(CosmosMsg::AuthzGrant {
                granter: sender.to_string(),
                grantee: grantee.to_string(),
                msg_type_url: msg_type_url.to_string(),
            })
        }
        TxType::FeegrantAllowance => {
            let grantee = fields.required_str("granteeAddress")?;
            codec.check_account("granteeAddress", grantee)?;
            let spend_limit = match fields.optional_str("spendLimit")? {
                Some(raw) => vec![parse_coin("spendLimit", raw)?],
                None => Vec::new(),
            };
            Ok(CosmosMsg::FeegrantAllowance {
                granter: sender.to_string(),
                grantee: grantee.to_string(),
                spend_limit,
            })
        }
        TxType::NativeTransfer => Err(TxError::UnsupportedTxType(tx_type.to_string())),
    }
}
