//! Converts one raw per-slot JSON document into a normalized [`Block`].
//!
//! Two source encodings are accepted for transaction messages: the raw
//! form, where instructions reference accounts by index into a shared key
//! table and signer/read-only flags must be derived from the message
//! header counts, and the pre-decoded form, where account keys carry
//! explicit flags and instructions may already hold a `{type, info}`
//! payload. Documents previously serialized from a [`Block`] (canonical
//! dumps) are recognized and deserialized directly, which makes
//! normalization idempotent.

use serde_json::Value;
use thiserror::Error;

use crate::models::{
    AccountTransaction, Block, Commitment, InstructionPayload, InstructionTransaction, Reward,
    Transaction,
};

use super::schema;

#[derive(Error, Debug)]
pub enum MalformedBlockError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` has an unexpected shape")]
    WrongType(&'static str),

    #[error("instruction references account index {index} outside the key table (len {table_len})")]
    AccountIndexOutOfRange { index: u64, table_len: usize },

    #[error("balance lists do not line up with the account keys")]
    BalanceCountMismatch,

    #[error("canonical block document failed to deserialize: {0}")]
    Canonical(#[from] serde_json::Error),
}

/// Normalize a raw per-slot document. `slot` and `commitment` describe the
/// fetch context and are used when the document does not carry its own.
pub fn normalize(
    slot: u64,
    commitment: Commitment,
    raw: &Value,
) -> Result<Block, MalformedBlockError> {
    // Canonical dumps carry their own slot and commitment; raw RPC
    // documents never do.
    if raw.get(schema::SLOT).is_some() && raw.get(schema::COMMITMENT).is_some() {
        return Ok(serde_json::from_value(raw.clone())?);
    }

    let transactions = schema::req_array(raw, schema::TRANSACTIONS)?
        .iter()
        .map(normalize_transaction)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Block {
        slot,
        commitment,
        blockhash: schema::req_str(raw, schema::BLOCKHASH)?.to_owned(),
        previous_blockhash: schema::req_str(raw, schema::PREVIOUS_BLOCKHASH)?.to_owned(),
        parent_slot: schema::req_u64(raw, schema::PARENT_SLOT)?,
        block_time: schema::opt_i64(raw, schema::BLOCK_TIME)?,
        block_height: schema::opt_u64(raw, schema::BLOCK_HEIGHT)?,
        rewards: parse_rewards(raw.get(schema::REWARDS))?,
        transactions,
    })
}

fn normalize_transaction(raw_tx: &Value) -> Result<Transaction, MalformedBlockError> {
    let meta = schema::req(raw_tx, schema::META)?;
    let envelope = schema::req(raw_tx, schema::TRANSACTION)?;
    let message = schema::req(envelope, schema::MESSAGE)?;

    let signatures = schema::req_str_list(envelope, schema::SIGNATURES)?;
    let err = match schema::req(meta, schema::ERR)? {
        Value::Null => None,
        other => Some(other.clone()),
    };

    let keys = parse_account_keys(message)?;
    let accounts = build_account_rows(meta, message, &keys, &signatures)?;
    let instructions = parse_instructions(message, &keys)?;

    Ok(Transaction {
        signatures,
        err,
        fee: schema::req_u64(meta, schema::FEE)?,
        rewards: parse_rewards(meta.get(schema::REWARDS))?,
        accounts,
        instructions,
    })
}

fn parse_rewards(value: Option<&Value>) -> Result<Vec<Reward>, MalformedBlockError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|_| MalformedBlockError::WrongType(schema::REWARDS)),
    }
}

/// One account-key entry of the message. Flags are present only in the
/// pre-decoded encoding; the raw encoding derives them from the header.
struct AccountKey {
    pubkey: String,
    flags: Option<(bool, bool)>, // (signer, writable)
}

fn parse_account_keys(message: &Value) -> Result<Vec<AccountKey>, MalformedBlockError> {
    schema::req_array(message, schema::ACCOUNT_KEYS)?
        .iter()
        .map(|entry| match entry {
            Value::String(pubkey) => Ok(AccountKey {
                pubkey: pubkey.clone(),
                flags: None,
            }),
            Value::Object(_) => {
                let pubkey = schema::req_str(entry, schema::PUBKEY)?.to_owned();
                let signer = entry
                    .get(schema::SIGNER)
                    .and_then(Value::as_bool)
                    .ok_or(MalformedBlockError::WrongType(schema::SIGNER))?;
                let writable = entry
                    .get(schema::WRITABLE)
                    .and_then(Value::as_bool)
                    .ok_or(MalformedBlockError::WrongType(schema::WRITABLE))?;
                Ok(AccountKey {
                    pubkey,
                    flags: Some((signer, writable)),
                })
            }
            _ => Err(MalformedBlockError::WrongType(schema::ACCOUNT_KEYS)),
        })
        .collect()
}

/// Message header counts of the raw encoding. Account index `i` is a
/// signer iff `i < num_required_signatures`; it is read-only iff it falls
/// in the trailing readonly sub-range of either the signer block or the
/// remaining unsigned block.
struct MessageHeader {
    num_required_signatures: usize,
    num_readonly_signed: usize,
    num_readonly_unsigned: usize,
}

impl MessageHeader {
    fn parse(message: &Value) -> Result<Self, MalformedBlockError> {
        let header = schema::req(message, schema::HEADER)?;
        Ok(Self {
            num_required_signatures: schema::req_u64(header, schema::NUM_REQUIRED_SIGNATURES)?
                as usize,
            num_readonly_signed: schema::req_u64(header, schema::NUM_READONLY_SIGNED_ACCOUNTS)?
                as usize,
            num_readonly_unsigned: schema::req_u64(header, schema::NUM_READONLY_UNSIGNED_ACCOUNTS)?
                as usize,
        })
    }

    fn is_signer(&self, index: usize) -> bool {
        index < self.num_required_signatures
    }

    fn is_read_only(&self, index: usize, total: usize) -> bool {
        if index < self.num_required_signatures {
            index
                >= self
                    .num_required_signatures
                    .saturating_sub(self.num_readonly_signed)
        } else {
            index >= total.saturating_sub(self.num_readonly_unsigned)
        }
    }
}

fn build_account_rows(
    meta: &Value,
    message: &Value,
    keys: &[AccountKey],
    signatures: &[String],
) -> Result<Vec<AccountTransaction>, MalformedBlockError> {
    let pre_balances = schema::req_u64_list(meta, schema::PRE_BALANCES)?;
    let post_balances = schema::req_u64_list(meta, schema::POST_BALANCES)?;
    if pre_balances.len() != keys.len() || post_balances.len() != keys.len() {
        return Err(MalformedBlockError::BalanceCountMismatch);
    }

    // The header is only needed when at least one key comes without flags.
    let header = if keys.iter().any(|k| k.flags.is_none()) {
        Some(MessageHeader::parse(message)?)
    } else {
        None
    };

    keys.iter()
        .enumerate()
        .map(|(index, key)| {
            let (signer, writable) = match (key.flags, &header) {
                (Some(flags), _) => flags,
                (None, Some(header)) => (
                    header.is_signer(index),
                    !header.is_read_only(index, keys.len()),
                ),
                // Unreachable by construction of `header`, but the schema
                // error is the honest answer if it ever happens.
                (None, None) => return Err(MalformedBlockError::MissingField(schema::HEADER)),
            };
            Ok(AccountTransaction {
                pubkey: key.pubkey.clone(),
                pre_balance: pre_balances[index],
                post_balance: post_balances[index],
                read_only: !writable,
                signer,
                signature: signatures.get(index).cloned(),
            })
        })
        .collect()
}

fn parse_instructions(
    message: &Value,
    keys: &[AccountKey],
) -> Result<Vec<InstructionTransaction>, MalformedBlockError> {
    schema::req_array(message, schema::INSTRUCTIONS)?
        .iter()
        .enumerate()
        .map(|(index, raw_ix)| {
            let program_account = match schema::opt_u64(raw_ix, schema::PROGRAM_ID_INDEX)? {
                Some(key_index) => resolve_key(keys, key_index)?,
                None => schema::req_str(raw_ix, schema::PROGRAM_ID)?.to_owned(),
            };
            let program_name = match raw_ix.get(schema::PROGRAM) {
                None | Some(Value::Null) => None,
                Some(v) => Some(
                    v.as_str()
                        .ok_or(MalformedBlockError::WrongType(schema::PROGRAM))?
                        .to_owned(),
                ),
            };
            Ok(InstructionTransaction {
                index,
                program_account,
                program_name,
                data: parse_payload(raw_ix)?,
                accounts: parse_instruction_accounts(raw_ix, keys)?,
            })
        })
        .collect()
}

fn resolve_key(keys: &[AccountKey], index: u64) -> Result<String, MalformedBlockError> {
    keys.get(index as usize)
        .map(|k| k.pubkey.clone())
        .ok_or(MalformedBlockError::AccountIndexOutOfRange {
            index,
            table_len: keys.len(),
        })
}

fn parse_payload(raw_ix: &Value) -> Result<InstructionPayload, MalformedBlockError> {
    if let Some(data) = raw_ix.get(schema::DATA) {
        let data = data
            .as_str()
            .ok_or(MalformedBlockError::WrongType(schema::DATA))?;
        return Ok(InstructionPayload::Raw(data.to_owned()));
    }
    match raw_ix.get(schema::PARSED) {
        // A decoded payload is usually `{type, info}` but degrades to a
        // bare string when the source could only identify the program.
        Some(parsed) => serde_json::from_value(parsed.clone())
            .map_err(|_| MalformedBlockError::WrongType(schema::PARSED)),
        None => Err(MalformedBlockError::MissingField(schema::DATA)),
    }
}

fn parse_instruction_accounts(
    raw_ix: &Value,
    keys: &[AccountKey],
) -> Result<Vec<String>, MalformedBlockError> {
    match raw_ix.get(schema::ACCOUNTS) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry {
                Value::String(pubkey) => Ok(pubkey.clone()),
                Value::Number(_) => {
                    let key_index = entry
                        .as_u64()
                        .ok_or(MalformedBlockError::WrongType(schema::ACCOUNTS))?;
                    resolve_key(keys, key_index)
                }
                _ => Err(MalformedBlockError::WrongType(schema::ACCOUNTS)),
            })
            .collect(),
        Some(_) => Err(MalformedBlockError::WrongType(schema::ACCOUNTS)),
    }
}
