//! Epoch-to-slot-range arithmetic for chains with fixed-length epochs.

use std::ops::Range;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpochError {
    #[error("epoch {epoch} predates the first normal epoch {first_normal_epoch}")]
    BeforeFirstNormal { epoch: u64, first_normal_epoch: u64 },
}

/// Schedule parameters as reported by the chain. Only normal-length epochs
/// (from `first_normal_epoch` on) have a derivable slot range.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochSchedule {
    pub first_normal_epoch: u64,
    pub first_normal_slot: u64,
    pub slots_per_epoch: u64,
}

impl EpochSchedule {
    /// Absolute slot range `[first, last)` covered by `epoch`.
    pub fn slot_bounds(&self, epoch: u64) -> Result<Range<u64>, EpochError> {
        if epoch < self.first_normal_epoch {
            return Err(EpochError::BeforeFirstNormal {
                epoch,
                first_normal_epoch: self.first_normal_epoch,
            });
        }
        let first = self.first_normal_slot + self.slots_per_epoch * (epoch - self.first_normal_epoch);
        Ok(first..first + self.slots_per_epoch)
    }
}
