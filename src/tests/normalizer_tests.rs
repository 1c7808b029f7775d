use serde_json::json;

use crate::ledger::normalizer::{normalize, MalformedBlockError};
use crate::models::{Commitment, InstructionPayload};

use super::support::{
    parsed_vote_transaction_doc, raw_block_doc, raw_transaction_doc, AUTHORITY_1, AUTHORITY_3,
    AUTHORITY_4, VOTE_PROGRAM,
};

const SLOT: u64 = 131_856_396;

#[test]
fn classifies_accounts_from_header_counts() {
    // Header (numRequiredSignatures=2, readonlySigned=1, readonlyUnsigned=1)
    // over four accounts.
    let doc = raw_block_doc(vec![raw_transaction_doc()]);
    let block = normalize(SLOT, Commitment::Finalized, &doc).unwrap();

    let accounts = &block.transactions[0].accounts;
    assert_eq!(accounts.len(), 4);

    assert!(accounts[0].signer && !accounts[0].read_only);
    assert!(accounts[1].signer && accounts[1].read_only);
    assert!(!accounts[2].signer && !accounts[2].read_only);
    assert!(!accounts[3].signer && accounts[3].read_only);
}

#[test]
fn pads_signatures_past_required_count() {
    let doc = raw_block_doc(vec![raw_transaction_doc()]);
    let block = normalize(SLOT, Commitment::Finalized, &doc).unwrap();

    let accounts = &block.transactions[0].accounts;
    assert_eq!(accounts[0].signature.as_deref(), Some("sig-one"));
    assert_eq!(accounts[1].signature.as_deref(), Some("sig-two"));
    assert_eq!(accounts[2].signature, None);
    assert_eq!(accounts[3].signature, None);
}

#[test]
fn resolves_instruction_account_indices() {
    let doc = raw_block_doc(vec![raw_transaction_doc()]);
    let block = normalize(SLOT, Commitment::Finalized, &doc).unwrap();

    let ix = &block.transactions[0].instructions[0];
    assert_eq!(ix.index, 0);
    assert_eq!(ix.program_account, AUTHORITY_4);
    assert_eq!(ix.accounts, vec![AUTHORITY_1.to_string(), AUTHORITY_3.to_string()]);
    assert_eq!(ix.data, InstructionPayload::Raw("3Bxs4h24hBtQy9rw".to_string()));
}

#[test]
fn accepts_predecoded_instructions_and_key_flags() {
    let doc = raw_block_doc(vec![parsed_vote_transaction_doc(AUTHORITY_1, &[100, 101, 102])]);
    let block = normalize(SLOT, Commitment::Finalized, &doc).unwrap();

    let tx = &block.transactions[0];
    assert!(tx.accounts[0].signer && !tx.accounts[0].read_only);
    assert!(!tx.accounts[1].signer && tx.accounts[1].read_only);

    let ix = &tx.instructions[0];
    assert_eq!(ix.program_account, VOTE_PROGRAM);
    assert_eq!(ix.program_name.as_deref(), Some("vote"));
    let (kind, info) = ix.data.as_parsed().unwrap();
    assert_eq!(kind, "vote");
    assert_eq!(info["voteAuthority"], AUTHORITY_1);
}

#[test]
fn normalization_is_idempotent() {
    let doc = raw_block_doc(vec![
        raw_transaction_doc(),
        parsed_vote_transaction_doc(AUTHORITY_1, &[100, 101]),
    ]);
    let first = normalize(SLOT, Commitment::Finalized, &doc).unwrap();

    let canonical = serde_json::to_value(&first).unwrap();
    let second = normalize(0, Commitment::Processed, &canonical).unwrap();

    // The canonical document carries its own slot and commitment, so the
    // fetch-context arguments must not leak into the result.
    assert_eq!(first, second);
    assert_eq!(second.slot, SLOT);
    assert_eq!(second.commitment, Commitment::Finalized);
}

#[test]
fn rejects_missing_required_fields() {
    let mut doc = raw_block_doc(vec![]);
    doc.as_object_mut().unwrap().remove("blockhash");

    let err = normalize(SLOT, Commitment::Finalized, &doc).unwrap_err();
    assert!(matches!(err, MalformedBlockError::MissingField("blockhash")));
}

#[test]
fn rejects_transaction_without_meta() {
    let mut tx = raw_transaction_doc();
    tx.as_object_mut().unwrap().remove("meta");

    let err = normalize(SLOT, Commitment::Finalized, &raw_block_doc(vec![tx])).unwrap_err();
    assert!(matches!(err, MalformedBlockError::MissingField("meta")));
}

#[test]
fn rejects_balance_lists_shorter_than_keys() {
    let mut tx = raw_transaction_doc();
    tx["meta"]["preBalances"] = json!([10u64]);

    let err = normalize(SLOT, Commitment::Finalized, &raw_block_doc(vec![tx])).unwrap_err();
    assert!(matches!(err, MalformedBlockError::BalanceCountMismatch));
}

#[test]
fn rejects_account_index_outside_key_table() {
    let mut tx = raw_transaction_doc();
    tx["transaction"]["message"]["instructions"][0]["programIdIndex"] = json!(9u64);

    let err = normalize(SLOT, Commitment::Finalized, &raw_block_doc(vec![tx])).unwrap_err();
    assert!(matches!(
        err,
        MalformedBlockError::AccountIndexOutOfRange { index: 9, .. }
    ));
}

#[test]
fn tolerates_null_rewards_and_missing_optionals() {
    let mut doc = raw_block_doc(vec![parsed_vote_transaction_doc(AUTHORITY_1, &[100])]);
    doc["rewards"] = json!(null);
    doc.as_object_mut().unwrap().remove("blockTime");
    doc["blockHeight"] = json!(null);

    let block = normalize(SLOT, Commitment::Confirmed, &doc).unwrap();
    assert!(block.rewards.is_empty());
    assert_eq!(block.block_time, None);
    assert_eq!(block.block_height, None);
    assert!(block.can_change());
}

#[test]
fn keeps_transaction_error_value() {
    let mut tx = parsed_vote_transaction_doc(AUTHORITY_1, &[100]);
    tx["meta"]["err"] = json!({"InstructionError": [0, "Custom"]});

    let block = normalize(SLOT, Commitment::Finalized, &raw_block_doc(vec![tx])).unwrap();
    assert!(!block.transactions[0].succeeded());
}
