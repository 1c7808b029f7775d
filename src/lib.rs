pub mod analysis;
pub mod config;
pub mod ledger;
pub mod models;
pub mod validation;

#[cfg(test)]
mod tests;

// Re-export specific items for convenience if desired
pub use analysis::report::{ValidatorBehavior, VoteBehaviorReport};
pub use analysis::{analyze_vote_behavior, survey_block_production, AnalysisError, AnalysisParams};
pub use config::Config;
pub use ledger::{BlockLoader, BlockSource, FileStore, LoaderError, MalformedBlockError, SourceError};
pub use models::{Block, Commitment, LeaderSchedule, Transaction};
pub use validation::{validate_sensitivity, validate_solana_address, ValidationError};
