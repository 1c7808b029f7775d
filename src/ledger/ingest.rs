//! Copies a slot range from any [`BlockSource`] into a [`FileStore`],
//! persisting documents in canonical normalized form so later runs can
//! analyze offline.

use std::collections::HashMap;
use std::ops::Range;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::LeaderSchedule;

use super::loader::{BlockLoader, LoaderError};
use super::source::{BlockSource, SourceError};
use super::store::FileStore;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Load(#[from] LoaderError),

    #[error("failed to persist document: {0}")]
    Store(#[from] SourceError),

    #[error("leader schedule for epoch {0} not available from source")]
    ScheduleUnavailable(u64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Drain `slots` from the loader's source into the store. Absent slots are
/// counted and skipped; transient source failures are retried inside the
/// loader; malformed documents abort the run with the slot identified.
pub async fn ingest_slots<S: BlockSource>(
    loader: &BlockLoader<S>,
    store: &FileStore,
    epoch: u64,
    slots: Range<u64>,
) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::default();
    for slot in slots {
        match loader.load(epoch, slot).await? {
            Some(block) => {
                let doc = serde_json::to_value(block.as_ref()).map_err(SourceError::from)?;
                store.write_block_document(epoch, slot, &doc).await?;
                summary.written += 1;
            }
            None => {
                debug!(slot, "no block to ingest");
                summary.skipped += 1;
            }
        }
    }
    info!(
        epoch,
        written = summary.written,
        skipped = summary.skipped,
        "slot ingestion finished"
    );
    Ok(summary)
}

/// Fetch the epoch's leader schedule, resolve relative slot offsets to
/// absolute slots and persist it.
pub async fn ingest_leader_schedule<S: BlockSource>(
    source: &S,
    store: &FileStore,
    epoch: u64,
    first_slot: u64,
) -> Result<LeaderSchedule, IngestError> {
    let doc = source
        .fetch_leader_schedule(epoch)
        .await
        .map_err(|source| LoaderError::ScheduleSource { epoch, source })?
        .ok_or(IngestError::ScheduleUnavailable(epoch))?;
    let offsets: HashMap<String, Vec<u64>> = serde_json::from_value(doc)
        .map_err(|source| LoaderError::MalformedSchedule { epoch, source })?;
    let schedule = LeaderSchedule::from_offsets(first_slot, offsets);
    store.write_leader_schedule(epoch, &schedule).await?;
    Ok(schedule)
}
