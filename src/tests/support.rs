//! Shared fixtures: valid pubkeys, model builders and raw-document
//! builders mirroring the RPC encoding variants.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{json, Value};

use crate::config::Config;
use crate::models::{
    Block, Commitment, InstructionPayload, InstructionTransaction, Transaction,
};

pub const VOTE_PROGRAM: &str = "Vote111111111111111111111111111111111111111";

// Valid base58-encoded 32-byte pubkeys for test validators.
pub const AUTHORITY_1: &str = "9ii1FEiWSgDzXAbwj2oTmJXzkfCw78mnHwPQv9WQ5iTn";
pub const AUTHORITY_2: &str = "AhAkbf3cGD6HkFod2rBEE8mie8ks9p7vuss6WGkUFAM9";
pub const AUTHORITY_3: &str = "FwKc3s5x7SguXzNPPJP7AV2UUhCF4rnEQCFdA2Q8NGCi";
pub const AUTHORITY_4: &str = "424CJUQd2RQWNgygWbNpRmQStZ77Mea2f29CATe8M2hS";
pub const AUTHORITY_5: &str = "So11111111111111111111111111111111111111112";
pub const AUTHORITY_6: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const AUTHORITY_7: &str = "Stake11111111111111111111111111111111111111";

pub fn test_config(data_dir: PathBuf) -> Config {
    Config {
        data_dir,
        epoch: 304,
        start_slot: 131_328_000,
        slot_count: 10,
        sensitivity: 2.0,
        min_samples: 5,
        max_validators: 100,
        absent_slot_policy: Default::default(),
        load_concurrency: 2,
        retry_max_times: 1,
        retry_min_delay: Duration::from_millis(10),
        cache_max_capacity: 100,
        assumed_commitment: Commitment::Finalized,
    }
}

/// A unique, pre-cleaned scratch directory for file-store tests.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "vote-behavior-service-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// A vote transaction as it looks after normalization.
pub fn vote_transaction(authority: &str, target: u64, err: Option<Value>) -> Transaction {
    Transaction {
        signatures: vec![format!("sig-{authority}-{target}")],
        err,
        fee: 5000,
        rewards: vec![],
        accounts: vec![],
        instructions: vec![InstructionTransaction {
            index: 0,
            program_account: VOTE_PROGRAM.to_string(),
            program_name: Some("vote".to_string()),
            data: InstructionPayload::Parsed {
                kind: "vote".to_string(),
                info: json!({
                    "voteAuthority": authority,
                    "voteAccount": AUTHORITY_4,
                    "vote": {
                        "hash": "J9rQqkGy4zFTXvXVitDNxAKHvUJPH7PLYYbSMMHT6jLS",
                        "slots": [target.saturating_sub(2), target.saturating_sub(1), target],
                        "timestamp": 1_650_000_000i64,
                    },
                }),
            },
            accounts: vec![],
        }],
    }
}

/// A finalized block holding the given (authority, vote target) pairs.
pub fn vote_block(slot: u64, votes: &[(&str, u64)]) -> Block {
    Block {
        slot,
        commitment: Commitment::Finalized,
        blockhash: format!("hash-{slot}"),
        previous_blockhash: format!("hash-{}", slot - 1),
        parent_slot: slot - 1,
        block_time: Some(1_650_000_000 + slot as i64),
        block_height: Some(slot.saturating_sub(20_000)),
        rewards: vec![],
        transactions: votes
            .iter()
            .map(|(authority, target)| vote_transaction(authority, *target, None))
            .collect(),
    }
}

/// Raw RPC block document wrapping the given transaction documents.
pub fn raw_block_doc(transactions: Vec<Value>) -> Value {
    json!({
        "blockhash": "8HS7zWNr7HUgNhsqjrreKStQP9AYZxoNdNMhGVPWFFbW",
        "previousBlockhash": "D66Rb8ae3tJbBWqCBL3dqqxV7gdeftsv7PzaJSYtuMGG",
        "parentSlot": 131_856_395u64,
        "blockTime": 1_650_000_000i64,
        "blockHeight": 120_000_000u64,
        "rewards": [
            {
                "pubkey": AUTHORITY_1,
                "lamports": -3000i64,
                "postBalance": 10_000u64,
                "rewardType": "Rent",
                "commission": null,
            }
        ],
        "transactions": transactions,
    })
}

/// Raw-encoding transaction: string account keys, header counts,
/// instructions referencing accounts by index.
pub fn raw_transaction_doc() -> Value {
    json!({
        "meta": {
            "err": null,
            "fee": 5000u64,
            "rewards": [],
            "preBalances": [10u64, 20u64, 30u64, 40u64],
            "postBalances": [11u64, 21u64, 31u64, 41u64],
        },
        "transaction": {
            "signatures": ["sig-one", "sig-two"],
            "message": {
                "accountKeys": [AUTHORITY_1, AUTHORITY_2, AUTHORITY_3, AUTHORITY_4],
                "header": {
                    "numRequiredSignatures": 2u64,
                    "numReadonlySignedAccounts": 1u64,
                    "numReadonlyUnsignedAccounts": 1u64,
                },
                "instructions": [
                    {
                        "programIdIndex": 3u64,
                        "accounts": [0u64, 2u64],
                        "data": "3Bxs4h24hBtQy9rw",
                    }
                ],
            },
        },
    })
}

/// Pre-decoded (jsonParsed) transaction carrying one vote instruction.
pub fn parsed_vote_transaction_doc(authority: &str, targets: &[u64]) -> Value {
    json!({
        "meta": {
            "err": null,
            "fee": 5000u64,
            "rewards": null,
            "preBalances": [10u64, 20u64],
            "postBalances": [5u64, 20u64],
        },
        "transaction": {
            "signatures": [format!("sig-{authority}")],
            "message": {
                "accountKeys": [
                    {"pubkey": authority, "signer": true, "writable": true},
                    {"pubkey": AUTHORITY_4, "signer": false, "writable": false},
                ],
                "instructions": [
                    {
                        "program": "vote",
                        "programId": VOTE_PROGRAM,
                        "parsed": {
                            "type": "vote",
                            "info": {
                                "voteAuthority": authority,
                                "voteAccount": AUTHORITY_4,
                                "vote": {
                                    "hash": "J9rQqkGy4zFTXvXVitDNxAKHvUJPH7PLYYbSMMHT6jLS",
                                    "slots": targets,
                                    "timestamp": 1_650_000_000i64,
                                },
                            },
                        },
                    }
                ],
            },
        },
    })
}
