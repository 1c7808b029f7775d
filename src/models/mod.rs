// Typed record model for normalized ledger data.
// A `Block` owns its `Transaction`s; a `Transaction` owns its per-account
// effect rows and decoded instructions. Serializing a `Block` yields the
// canonical document shape that the normalizer accepts back unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Finality guarantee under which a block record was observed.
/// Ordering follows the finality ladder: processed < confirmed < finalized.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment level: {other}")),
        }
    }
}

/// One reward entry attached to a block or a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub pubkey: String,
    pub lamports: i64,
    #[serde(default)]
    pub post_balance: Option<u64>,
    #[serde(default)]
    pub reward_type: Option<String>,
    #[serde(default)]
    pub commission: Option<u8>,
}

/// A normalized per-slot block record. Keyed by `slot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub slot: u64,
    pub commitment: Commitment,
    pub blockhash: String,
    pub previous_blockhash: String,
    pub parent_slot: u64,
    pub block_time: Option<i64>,
    pub block_height: Option<u64>,
    pub rewards: Vec<Reward>,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// A finalized block is immutable; anything weaker may still be
    /// replaced by a later fetch at the same slot.
    pub fn can_change(&self) -> bool {
        self.commitment != Commitment::Finalized
    }

    pub fn block_datetime(&self) -> Option<DateTime<Utc>> {
        self.block_time.and_then(|t| DateTime::from_timestamp(t, 0))
    }
}

/// A transaction inside one block, identified by its first signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub signatures: Vec<String>,
    /// `None` means the transaction succeeded; the raw error value is kept
    /// opaque since its shape varies across runtime versions.
    pub err: Option<Value>,
    pub fee: u64,
    pub rewards: Vec<Reward>,
    pub accounts: Vec<AccountTransaction>,
    pub instructions: Vec<InstructionTransaction>,
}

impl Transaction {
    pub fn id(&self) -> Option<&str> {
        self.signatures.first().map(String::as_str)
    }

    pub fn succeeded(&self) -> bool {
        self.err.is_none()
    }
}

/// Per-account effect row of one transaction. Keyed by
/// (transaction id, pubkey); exactly one row per message account key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTransaction {
    pub pubkey: String,
    pub pre_balance: u64,
    pub post_balance: u64,
    pub read_only: bool,
    pub signer: bool,
    /// Padded with `None` past the required-signature count so the list
    /// lines up with the account keys.
    pub signature: Option<String>,
}

/// Decoded instruction of one transaction, keyed by its index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionTransaction {
    pub index: usize,
    /// Program account pubkey, resolved through the key table when the
    /// source referenced it by index.
    pub program_account: String,
    /// Symbolic program name, when the source had already decoded it.
    pub program_name: Option<String>,
    pub data: InstructionPayload,
    /// Account keys involved, resolved to pubkey strings. Empty when the
    /// source did not carry an account list for this instruction.
    pub accounts: Vec<String>,
}

/// Instruction payload as delivered by the source: either opaque base58
/// bytes or a pre-decoded `{type, info}` structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstructionPayload {
    Parsed {
        #[serde(rename = "type")]
        kind: String,
        info: Value,
    },
    Raw(String),
}

impl InstructionPayload {
    pub fn as_parsed(&self) -> Option<(&str, &Value)> {
        match self {
            InstructionPayload::Parsed { kind, info } => Some((kind.as_str(), info)),
            InstructionPayload::Raw(_) => None,
        }
    }
}

/// Per-epoch assignment of block production: validator pubkey to the
/// absolute slots that validator leads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaderSchedule {
    assignments: HashMap<String, Vec<u64>>,
}

impl LeaderSchedule {
    pub fn new(assignments: HashMap<String, Vec<u64>>) -> Self {
        Self { assignments }
    }

    /// Build from the wire form where slots are offsets relative to the
    /// first slot of the epoch.
    pub fn from_offsets(first_slot: u64, offsets: HashMap<String, Vec<u64>>) -> Self {
        let assignments = offsets
            .into_iter()
            .map(|(pubkey, slots)| {
                let absolute = slots.into_iter().map(|s| first_slot + s).collect();
                (pubkey, absolute)
            })
            .collect();
        Self { assignments }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u64])> {
        self.assignments
            .iter()
            .map(|(pubkey, slots)| (pubkey.as_str(), slots.as_slice()))
    }

    /// Inverted view: slot to leader pubkey.
    pub fn slot_leaders(&self) -> HashMap<u64, &str> {
        let mut inverted = HashMap::new();
        for (pubkey, slots) in &self.assignments {
            for slot in slots {
                inverted.insert(*slot, pubkey.as_str());
            }
        }
        inverted
    }

    /// Assigned slot counts per validator, heaviest first. Ties break on
    /// pubkey so the order is stable.
    pub fn assignment_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .assignments
            .iter()
            .map(|(pubkey, slots)| (pubkey.as_str(), slots.len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts
    }
}
