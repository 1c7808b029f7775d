//! Per-validator vote time-series extraction.
//!
//! The extractor folds over blocks in slot order. At each position every
//! already-tracked authority first carries its last voted-target slot
//! forward by one entry; a vote landing in that block then overwrites the
//! carried-forward placeholder instead of appending a second entry. An
//! authority seen for the first time starts its series at the current
//! position with the single vote target.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;

use crate::models::{Block, Transaction};
use crate::validation::validate_solana_address;

const VOTE_KIND: &str = "vote";

// Key names inside the pre-decoded vote payload. The payload is opaque to
// the block schema, so these live here with their only consumer.
const VOTE_AUTHORITY: &str = "voteAuthority";
const VOTE: &str = "vote";
const SLOTS: &str = "slots";

/// What an absent slot does to the time axis.
///
/// `Skip` compresses the axis to present blocks only: an absent slot
/// advances nothing, and `first_vote + index` maps into the sequence of
/// present blocks. `Reserve` keeps one position per slot in the range:
/// tracked authorities carry forward across the gap, and
/// `first_vote + index` maps into literal range positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsentSlotPolicy {
    #[default]
    Skip,
    Reserve,
}

impl FromStr for AbsentSlotPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(AbsentSlotPolicy::Skip),
            "reserve" => Ok(AbsentSlotPolicy::Reserve),
            other => Err(format!("unknown absent-slot policy: {other}")),
        }
    }
}

/// Vote time series of one authority. `first_vote` is the 1-based position
/// at which the first vote landed; `votes[i]` is the most recent voted
/// target slot as of position `first_vote + i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub first_vote: usize,
    pub votes: Vec<u64>,
}

impl VoteRecord {
    fn begin(position: usize, target: u64) -> Self {
        Self {
            first_vote: position + 1,
            votes: vec![target],
        }
    }

    fn carry_forward(&mut self) {
        if let Some(&last) = self.votes.last() {
            self.votes.push(last);
        }
    }

    fn record_vote(&mut self, target: u64) {
        if let Some(last) = self.votes.last_mut() {
            *last = target;
        }
    }
}

/// Extraction result: records per authority, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct VoteLedger {
    order: Vec<String>,
    records: HashMap<String, VoteRecord>,
}

impl VoteLedger {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, pubkey: &str) -> Option<&VoteRecord> {
        self.records.get(pubkey)
    }

    /// Records in the order their authorities were first observed.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VoteRecord)> {
        self.order
            .iter()
            .filter_map(|pk| self.records.get(pk).map(|r| (pk.as_str(), r)))
    }

    /// Consume the ledger, keeping the first `cap` authorities observed.
    /// The cap bounds the quadratic distance stage; it is a performance
    /// limit, not a correctness constraint.
    pub fn into_leading(self, cap: usize) -> Vec<(String, VoteRecord)> {
        let mut records = self.records;
        self.order
            .into_iter()
            .take(cap)
            .filter_map(|pk| records.remove(&pk).map(|r| (pk, r)))
            .collect()
    }
}

pub struct VoteExtractor {
    policy: AbsentSlotPolicy,
    position: usize,
    ledger: VoteLedger,
    vote_program: String,
}

impl VoteExtractor {
    pub fn new(policy: AbsentSlotPolicy) -> Self {
        Self {
            policy,
            position: 0,
            ledger: VoteLedger::default(),
            vote_program: solana_sdk::vote::program::id().to_string(),
        }
    }

    /// Fold one present block into the series. Blocks must arrive in
    /// increasing slot order.
    pub fn observe_block(&mut self, block: &Block) {
        for record in self.ledger.records.values_mut() {
            record.carry_forward();
        }
        for tx in &block.transactions {
            self.scan_transaction(tx);
        }
        self.position += 1;
    }

    /// Fold one absent slot. Under `Skip` this is a no-op; under `Reserve`
    /// the slot still occupies a position and tracked authorities carry
    /// forward across it.
    pub fn observe_absent_slot(&mut self) {
        if self.policy == AbsentSlotPolicy::Reserve {
            for record in self.ledger.records.values_mut() {
                record.carry_forward();
            }
            self.position += 1;
        }
    }

    pub fn finish(self) -> VoteLedger {
        self.ledger
    }

    fn scan_transaction(&mut self, tx: &Transaction) {
        if !tx.succeeded() {
            return;
        }
        for ix in &tx.instructions {
            if ix.program_account != self.vote_program {
                continue;
            }
            let Some((kind, info)) = ix.data.as_parsed() else {
                continue;
            };
            if kind != VOTE_KIND {
                continue;
            }
            let Some(authority) = info.get(VOTE_AUTHORITY).and_then(|v| v.as_str()) else {
                warn!(tx = ?tx.id(), "vote payload without an authority pubkey");
                continue;
            };
            let Some(target) = info
                .get(VOTE)
                .and_then(|v| v.get(SLOTS))
                .and_then(|v| v.as_array())
                .and_then(|slots| slots.last())
                .and_then(|v| v.as_u64())
            else {
                warn!(tx = ?tx.id(), authority, "vote payload without voted slots");
                continue;
            };
            if let Err(e) = validate_solana_address(authority) {
                warn!(authority, %e, "skipping vote with invalid authority");
                continue;
            }
            self.record(authority, target);
        }
    }

    fn record(&mut self, authority: &str, target: u64) {
        match self.ledger.records.get_mut(authority) {
            Some(record) => record.record_vote(target),
            None => {
                self.ledger.order.push(authority.to_owned());
                self.ledger
                    .records
                    .insert(authority.to_owned(), VoteRecord::begin(self.position, target));
            }
        }
    }
}
