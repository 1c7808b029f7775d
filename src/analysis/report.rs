//! Read-only analysis output, shaped for a downstream reporting or
//! visualization collaborator.

use std::collections::BTreeMap;

use serde::Serialize;

use super::cluster::ClusterLabel;
use super::votes::VoteRecord;

/// One analyzed validator: where its tracking started, its vote series and
/// the cluster it landed in (`-1` is the noise/outlier label).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorBehavior {
    pub pubkey: String,
    pub first_vote: usize,
    pub votes: Vec<u64>,
    pub label: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteBehaviorReport {
    pub epoch: u64,
    pub sensitivity: f64,
    pub validators: Vec<ValidatorBehavior>,
}

impl VoteBehaviorReport {
    pub fn from_parts(
        epoch: u64,
        sensitivity: f64,
        entries: Vec<(String, VoteRecord)>,
        labels: Vec<ClusterLabel>,
    ) -> Self {
        let validators = entries
            .into_iter()
            .zip(labels)
            .map(|((pubkey, record), label)| ValidatorBehavior {
                pubkey,
                first_vote: record.first_vote,
                votes: record.votes,
                label: label.as_i64(),
            })
            .collect();
        Self {
            epoch,
            sensitivity,
            validators,
        }
    }

    /// Validators whose voting timing did not fit any dense cluster.
    pub fn outliers(&self) -> impl Iterator<Item = &ValidatorBehavior> {
        self.validators
            .iter()
            .filter(|v| v.label == super::cluster::NOISE_LABEL)
    }

    /// Validator count per label, noise included.
    pub fn cluster_sizes(&self) -> BTreeMap<i64, usize> {
        let mut sizes = BTreeMap::new();
        for v in &self.validators {
            *sizes.entry(v.label).or_insert(0) += 1;
        }
        sizes
    }
}
