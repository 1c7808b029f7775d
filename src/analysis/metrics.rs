//! Per-block and per-schedule aggregate measures, consumed by reporting
//! collaborators.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::{Block, LeaderSchedule};

const RENT_REWARD_TYPE: &str = "Rent";

/// Lamports collected as rent in one block (rent rewards are negative
/// deltas on the paying accounts).
pub fn rent_collected(block: &Block) -> i64 {
    block
        .rewards
        .iter()
        .filter(|rw| rw.reward_type.as_deref() == Some(RENT_REWARD_TYPE))
        .map(|rw| -rw.lamports)
        .sum()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub total: usize,
    pub failed: usize,
}

pub fn transaction_stats(block: &Block) -> TransactionStats {
    TransactionStats {
        total: block.transactions.len(),
        failed: block
            .transactions
            .iter()
            .filter(|tx| !tx.succeeded())
            .count(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductionStats {
    pub assigned: u64,
    pub missed: u64,
}

/// Block production per leader over `slots`: how many of its assigned
/// slots fall in the range, and how many of those have no block in
/// `produced`. Slots the schedule does not cover are skipped.
pub fn block_production(
    schedule: &LeaderSchedule,
    slots: impl IntoIterator<Item = u64>,
    produced: &HashSet<u64>,
) -> HashMap<String, ProductionStats> {
    let leaders = schedule.slot_leaders();
    let mut stats: HashMap<String, ProductionStats> = HashMap::new();
    for slot in slots {
        let Some(leader) = leaders.get(&slot) else {
            debug!(slot, "slot not covered by the leader schedule");
            continue;
        };
        let entry = stats.entry((*leader).to_owned()).or_default();
        entry.assigned += 1;
        if !produced.contains(&slot) {
            entry.missed += 1;
        }
    }
    stats
}
