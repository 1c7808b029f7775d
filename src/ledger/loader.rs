//! Raw block loading with retry and caching on top of a [`BlockSource`].

use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Block, Commitment, LeaderSchedule};

use super::normalizer::{normalize, MalformedBlockError};
use super::source::{BlockSource, SourceError};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("source failure while loading slot {slot}: {source}")]
    Source {
        slot: u64,
        #[source]
        source: SourceError,
    },

    #[error("malformed block document at slot {slot}: {source}")]
    MalformedBlock {
        slot: u64,
        #[source]
        source: MalformedBlockError,
    },

    #[error("source failure while loading leader schedule of epoch {epoch}: {source}")]
    ScheduleSource {
        epoch: u64,
        #[source]
        source: SourceError,
    },

    #[error("malformed leader schedule for epoch {epoch}: {source}")]
    MalformedSchedule {
        epoch: u64,
        #[source]
        source: serde_json::Error,
    },
}

/// Bounded delay-and-retry policy applied to transient source failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_times: usize,
    pub min_delay: Duration,
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_times(self.max_times)
            .with_jitter()
    }
}

pub struct BlockLoader<S> {
    source: S,
    retry: RetryPolicy,
    assumed_commitment: Commitment,
    /// Finalized blocks only; anything weaker may be replaced by a later
    /// fetch at the same slot and must not be served from cache.
    cache: Cache<u64, Arc<Block>>,
}

impl<S: BlockSource> BlockLoader<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            retry: RetryPolicy {
                max_times: config.retry_max_times,
                min_delay: config.retry_min_delay,
            },
            assumed_commitment: config.assumed_commitment,
            cache: Cache::new(config.cache_max_capacity),
        }
    }

    /// Load and normalize the block at `slot`. `Ok(None)` means no block
    /// exists there — an expected outcome on a chain with skipped slots.
    pub async fn load(&self, epoch: u64, slot: u64) -> Result<Option<Arc<Block>>, LoaderError> {
        if let Some(block) = self.cache.get(&slot).await {
            debug!(slot, "block served from cache");
            return Ok(Some(block));
        }

        let raw = (|| self.source.fetch_block(epoch, slot))
            .retry(self.retry.backoff())
            .when(SourceError::is_transient)
            .notify(|err, delay| warn!(slot, %err, ?delay, "retrying block fetch"))
            .await
            .map_err(|source| LoaderError::Source { slot, source })?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let block = normalize(slot, self.assumed_commitment, &raw)
            .map_err(|source| LoaderError::MalformedBlock { slot, source })?;
        let block = Arc::new(block);
        if !block.can_change() {
            self.cache.insert(slot, Arc::clone(&block)).await;
        }
        Ok(Some(block))
    }

    /// Load the leader schedule of an epoch. `Ok(None)` when the source
    /// has no schedule for it.
    pub async fn load_leader_schedule(
        &self,
        epoch: u64,
    ) -> Result<Option<LeaderSchedule>, LoaderError> {
        let raw = (|| self.source.fetch_leader_schedule(epoch))
            .retry(self.retry.backoff())
            .when(SourceError::is_transient)
            .notify(|err, delay| warn!(epoch, %err, ?delay, "retrying leader schedule fetch"))
            .await
            .map_err(|source| LoaderError::ScheduleSource { epoch, source })?;

        match raw {
            Some(doc) => serde_json::from_value(doc)
                .map(Some)
                .map_err(|source| LoaderError::MalformedSchedule { epoch, source }),
            None => Ok(None),
        }
    }
}
