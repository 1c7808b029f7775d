// Configuration structure for:
// - data directory holding dumped per-slot documents
// - epoch and slot window to analyze
// - clustering sensitivity and validator cap
// - loader cache, concurrency and retry policy

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::analysis::votes::AbsentSlotPolicy;
use crate::models::Commitment;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub epoch: u64,
    pub start_slot: u64,
    pub slot_count: u64,
    pub sensitivity: f64,
    pub min_samples: usize,
    pub max_validators: usize,
    pub absent_slot_policy: AbsentSlotPolicy,
    pub load_concurrency: usize,
    pub retry_max_times: usize,
    pub retry_min_delay: Duration,
    pub cache_max_capacity: u64,
    /// Commitment assumed for documents that do not state their own.
    /// Dumped blocks are captured finalized.
    pub assumed_commitment: Commitment,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        let epoch = env::var("EPOCH")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .unwrap_or(0);
        let start_slot = env::var("START_SLOT")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .unwrap_or(0);
        let slot_count = env::var("SLOT_COUNT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100);
        let sensitivity = env::var("SENSITIVITY")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .unwrap_or(2.0);
        let min_samples = env::var("MIN_SAMPLES")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);
        let max_validators = env::var("MAX_VALIDATORS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100);
        let absent_slot_policy = env::var("ABSENT_SLOT_POLICY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let load_concurrency = env::var("LOAD_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(num_cpus::get);
        let retry_max_times = env::var("RETRY_MAX_TIMES")
            .map(|v| v.parse().unwrap_or(5))
            .unwrap_or(5);
        let retry_min_delay = env::var("RETRY_MIN_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(500));
        let cache_max_capacity = env::var("CACHE_MAX_CAPACITY")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .unwrap_or(1000);
        let assumed_commitment = env::var("ASSUMED_COMMITMENT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Commitment::Finalized);

        Self {
            data_dir,
            epoch,
            start_slot,
            slot_count,
            sensitivity,
            min_samples,
            max_validators,
            absent_slot_policy,
            load_concurrency,
            retry_max_times,
            retry_min_delay,
            cache_max_capacity,
            assumed_commitment,
        }
    }
}
