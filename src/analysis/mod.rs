//! Voting-behavior analysis over a slot range: extract per-validator vote
//! series, build the pairwise distance matrix, cluster, and report.

pub mod cluster;
pub mod distance;
pub mod metrics;
pub mod report;
pub mod votes;

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use futures::{stream, StreamExt};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::ledger::loader::{BlockLoader, LoaderError};
use crate::ledger::source::BlockSource;
use crate::models::LeaderSchedule;

use cluster::{dbscan, ClusterParams};
use distance::DistanceMatrix;
use metrics::ProductionStats;
use report::VoteBehaviorReport;
use votes::{AbsentSlotPolicy, VoteExtractor};

// Re-exports for convenience
pub use cluster::{ClusterLabel, NOISE_LABEL};
pub use report::ValidatorBehavior;
pub use votes::{VoteLedger, VoteRecord};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Load(#[from] LoaderError),
}

#[derive(Debug, Clone)]
pub struct AnalysisParams {
    pub epoch: u64,
    pub start_slot: u64,
    pub slot_count: u64,
    /// DBSCAN neighborhood radius over normalized DTW distances.
    pub sensitivity: f64,
    pub min_samples: usize,
    pub max_validators: usize,
    pub absent_slots: AbsentSlotPolicy,
    pub load_concurrency: usize,
}

impl AnalysisParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            epoch: config.epoch,
            start_slot: config.start_slot,
            slot_count: config.slot_count,
            sensitivity: config.sensitivity,
            min_samples: config.min_samples,
            max_validators: config.max_validators,
            absent_slots: config.absent_slot_policy,
            load_concurrency: config.load_concurrency,
        }
    }

    pub fn slots(&self) -> Range<u64> {
        self.start_slot..self.start_slot + self.slot_count
    }
}

/// Run the full pipeline. Slot loads run concurrently but their results
/// are folded strictly in slot order, so the outcome matches sequential
/// execution.
pub async fn analyze_vote_behavior<S: BlockSource>(
    loader: &BlockLoader<S>,
    params: &AnalysisParams,
) -> Result<VoteBehaviorReport, AnalysisError> {
    let epoch = params.epoch;
    let mut extractor = VoteExtractor::new(params.absent_slots);

    let mut blocks = stream::iter(params.slots())
        .map(|slot| async move { (slot, loader.load(epoch, slot).await) })
        .buffered(params.load_concurrency.max(1));

    let mut present = 0u64;
    while let Some((slot, outcome)) = blocks.next().await {
        match outcome? {
            Some(block) => {
                debug!(
                    slot,
                    transactions = block.transactions.len(),
                    time = ?block.block_datetime(),
                    "folding block"
                );
                extractor.observe_block(&block);
                present += 1;
            }
            None => {
                debug!(slot, "no block produced");
                extractor.observe_absent_slot();
            }
        }
    }

    let ledger = extractor.finish();
    let tracked = ledger.len();
    if tracked > params.max_validators {
        info!(
            tracked,
            analyzed = params.max_validators,
            "capping the analyzed validator set"
        );
    }
    let entries = ledger.into_leading(params.max_validators);

    info!(
        present,
        range = ?params.slots(),
        validators = entries.len(),
        "building distance matrix"
    );
    let series: Vec<&[u64]> = entries.iter().map(|(_, r)| r.votes.as_slice()).collect();
    let matrix = DistanceMatrix::build(&series);

    let labels = dbscan(
        &matrix,
        &ClusterParams {
            eps: params.sensitivity,
            min_samples: params.min_samples,
        },
    );

    Ok(VoteBehaviorReport::from_parts(
        epoch,
        params.sensitivity,
        entries,
        labels,
    ))
}

/// Assigned and missed block-production totals per leader over `slots`.
/// Presence is determined through the loader, so already-analyzed
/// finalized blocks come from its cache.
pub async fn survey_block_production<S: BlockSource>(
    loader: &BlockLoader<S>,
    schedule: &LeaderSchedule,
    epoch: u64,
    slots: Range<u64>,
) -> Result<HashMap<String, ProductionStats>, AnalysisError> {
    let mut produced = HashSet::new();
    for slot in slots.clone() {
        if loader.load(epoch, slot).await?.is_some() {
            produced.insert(slot);
        }
    }
    Ok(metrics::block_production(schedule, slots, &produced))
}
