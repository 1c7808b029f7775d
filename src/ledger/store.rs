//! File-backed block store.
//!
//! Layout contract: per-slot documents live at
//! `<root>/<epoch>/blocks/<slot>.json`, the leader schedule of an epoch at
//! `<root>/<epoch>/leader_schedule.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::models::LeaderSchedule;

use super::source::{BlockSource, SourceError};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, epoch: u64, slot: u64) -> PathBuf {
        self.root
            .join(epoch.to_string())
            .join("blocks")
            .join(format!("{slot}.json"))
    }

    fn leader_schedule_path(&self, epoch: u64) -> PathBuf {
        self.root.join(epoch.to_string()).join("leader_schedule.json")
    }

    async fn read_document(path: &Path) -> Result<Option<Value>, SourceError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SourceError::Io(e)),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn write_document(path: &Path, doc: &Value) -> Result<(), SourceError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec(doc)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    pub async fn write_block_document(
        &self,
        epoch: u64,
        slot: u64,
        doc: &Value,
    ) -> Result<(), SourceError> {
        let path = self.block_path(epoch, slot);
        Self::write_document(&path, doc).await?;
        debug!(slot, path = %path.display(), "wrote block document");
        Ok(())
    }

    pub async fn write_leader_schedule(
        &self,
        epoch: u64,
        schedule: &LeaderSchedule,
    ) -> Result<(), SourceError> {
        let path = self.leader_schedule_path(epoch);
        Self::write_document(&path, &serde_json::to_value(schedule)?).await?;
        debug!(epoch, path = %path.display(), "wrote leader schedule");
        Ok(())
    }
}

impl BlockSource for FileStore {
    async fn fetch_block(&self, epoch: u64, slot: u64) -> Result<Option<Value>, SourceError> {
        Self::read_document(&self.block_path(epoch, slot)).await
    }

    async fn fetch_leader_schedule(&self, epoch: u64) -> Result<Option<Value>, SourceError> {
        Self::read_document(&self.leader_schedule_path(epoch)).await
    }
}
