// Initialize logging and configuration, run the vote-behavior analysis
// over the configured slot window and emit the report on stdout for a
// downstream reporting collaborator.

use vote_behavior_service::{
    analyze_vote_behavior, survey_block_production, validate_sensitivity, AnalysisParams,
    BlockLoader, Config, FileStore,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting vote-behavior-service");

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Configuration loaded: {:?}", config);
    validate_sensitivity(config.sensitivity)?;

    let store = FileStore::new(&config.data_dir);
    let loader = BlockLoader::new(store, &config);
    let params = AnalysisParams::from_config(&config);

    let report = analyze_vote_behavior(&loader, &params).await?;
    for (label, size) in report.cluster_sizes() {
        tracing::info!(label, size, "cluster");
    }
    tracing::info!(
        validators = report.validators.len(),
        outliers = report.outliers().count(),
        "analysis finished"
    );

    // Block-production totals, when the epoch's leader schedule was dumped
    // alongside the blocks.
    match loader.load_leader_schedule(config.epoch).await? {
        Some(schedule) => {
            let production =
                survey_block_production(&loader, &schedule, config.epoch, params.slots()).await?;
            let missed_total: u64 = production.values().map(|s| s.missed).sum();
            tracing::info!(
                leaders = production.len(),
                missed_total,
                "block production surveyed"
            );
        }
        None => tracing::debug!(epoch = config.epoch, "no leader schedule dumped"),
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
