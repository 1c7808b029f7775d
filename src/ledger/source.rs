//! Seam towards the collaborator that holds raw per-slot documents.
//!
//! Implementations deliver raw JSON only; normalization and retry policy
//! live in the loader. The bundled implementation is the file-backed
//! [`FileStore`](super::store::FileStore); an RPC-backed client would plug
//! in behind the same trait.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    /// Rate limit or transport fault; worth retrying after a delay.
    #[error("transient source failure: {0}")]
    Transient(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

pub trait BlockSource {
    /// Fetch the raw document for one slot. `Ok(None)` means the slot has
    /// no block (skipped, or never dumped) — a normal outcome, never an
    /// error.
    fn fetch_block(
        &self,
        epoch: u64,
        slot: u64,
    ) -> impl Future<Output = Result<Option<Value>, SourceError>> + Send;

    /// Fetch the leader-schedule document of one epoch, as stored by this
    /// source.
    fn fetch_leader_schedule(
        &self,
        epoch: u64,
    ) -> impl Future<Output = Result<Option<Value>, SourceError>> + Send;
}
