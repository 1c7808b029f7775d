//! Field names and required-presence helpers for raw block documents.
//!
//! The normalizer is the only consumer of these names; no other module
//! should touch raw document keys.

use serde_json::Value;

use super::normalizer::MalformedBlockError;

pub(crate) const SLOT: &str = "slot";
pub(crate) const COMMITMENT: &str = "commitment";
pub(crate) const BLOCKHASH: &str = "blockhash";
pub(crate) const PREVIOUS_BLOCKHASH: &str = "previousBlockhash";
pub(crate) const PARENT_SLOT: &str = "parentSlot";
pub(crate) const BLOCK_TIME: &str = "blockTime";
pub(crate) const BLOCK_HEIGHT: &str = "blockHeight";
pub(crate) const REWARDS: &str = "rewards";
pub(crate) const TRANSACTIONS: &str = "transactions";

pub(crate) const META: &str = "meta";
pub(crate) const TRANSACTION: &str = "transaction";
pub(crate) const ERR: &str = "err";
pub(crate) const FEE: &str = "fee";
pub(crate) const PRE_BALANCES: &str = "preBalances";
pub(crate) const POST_BALANCES: &str = "postBalances";
pub(crate) const SIGNATURES: &str = "signatures";
pub(crate) const MESSAGE: &str = "message";
pub(crate) const ACCOUNT_KEYS: &str = "accountKeys";
pub(crate) const PUBKEY: &str = "pubkey";
pub(crate) const SIGNER: &str = "signer";
pub(crate) const WRITABLE: &str = "writable";
pub(crate) const HEADER: &str = "header";
pub(crate) const NUM_REQUIRED_SIGNATURES: &str = "numRequiredSignatures";
pub(crate) const NUM_READONLY_SIGNED_ACCOUNTS: &str = "numReadonlySignedAccounts";
pub(crate) const NUM_READONLY_UNSIGNED_ACCOUNTS: &str = "numReadonlyUnsignedAccounts";
pub(crate) const INSTRUCTIONS: &str = "instructions";
pub(crate) const PROGRAM_ID_INDEX: &str = "programIdIndex";
pub(crate) const PROGRAM_ID: &str = "programId";
pub(crate) const PROGRAM: &str = "program";
pub(crate) const ACCOUNTS: &str = "accounts";
pub(crate) const DATA: &str = "data";
pub(crate) const PARSED: &str = "parsed";

pub(crate) fn req<'a>(
    doc: &'a Value,
    field: &'static str,
) -> Result<&'a Value, MalformedBlockError> {
    doc.get(field)
        .ok_or(MalformedBlockError::MissingField(field))
}

pub(crate) fn req_str<'a>(
    doc: &'a Value,
    field: &'static str,
) -> Result<&'a str, MalformedBlockError> {
    req(doc, field)?
        .as_str()
        .ok_or(MalformedBlockError::WrongType(field))
}

pub(crate) fn req_u64(doc: &Value, field: &'static str) -> Result<u64, MalformedBlockError> {
    req(doc, field)?
        .as_u64()
        .ok_or(MalformedBlockError::WrongType(field))
}

pub(crate) fn req_array<'a>(
    doc: &'a Value,
    field: &'static str,
) -> Result<&'a [Value], MalformedBlockError> {
    req(doc, field)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or(MalformedBlockError::WrongType(field))
}

/// Absent or `null` both mean "not provided" for optional numeric fields.
pub(crate) fn opt_u64(doc: &Value, field: &'static str) -> Result<Option<u64>, MalformedBlockError> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or(MalformedBlockError::WrongType(field)),
    }
}

pub(crate) fn opt_i64(doc: &Value, field: &'static str) -> Result<Option<i64>, MalformedBlockError> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or(MalformedBlockError::WrongType(field)),
    }
}

pub(crate) fn req_u64_list(
    doc: &Value,
    field: &'static str,
) -> Result<Vec<u64>, MalformedBlockError> {
    req_array(doc, field)?
        .iter()
        .map(|v| v.as_u64().ok_or(MalformedBlockError::WrongType(field)))
        .collect()
}

pub(crate) fn req_str_list(
    doc: &Value,
    field: &'static str,
) -> Result<Vec<String>, MalformedBlockError> {
    req_array(doc, field)?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_owned)
                .ok_or(MalformedBlockError::WrongType(field))
        })
        .collect()
}
