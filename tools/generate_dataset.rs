//! Synthetic Dataset Generator
//!
//! Generates labeled AMM records with the heuristic rule labeler and writes
//! them as CSV for offline classifier training.

use amm_fraud_pipeline::{config::AppConfig, dataset, generator::SyntheticGenerator};
use anyhow::Result;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_dataset=info".parse()?)
                .add_directive("amm_fraud_pipeline=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let output = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("pharma_amm_data.csv");
    let count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let fraud_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.2);
    let seed: Option<u64> = args.get(4).and_then(|s| s.parse().ok());

    info!(
        output = %output,
        count,
        fraud_rate,
        seed = ?seed,
        "Configuration loaded"
    );

    // The feature constants must match what the service uses at inference
    // time; fall back to the built-in defaults when no config file exists.
    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Falling back to default configuration: {e:#}");
        AppConfig::default()
    });

    let generator = SyntheticGenerator::new(&config.features);
    let records = generator.generate(count, fraud_rate, seed)?;

    let fraud = records.iter().filter(|r| r.verdict.is_fraud).count();
    info!(
        total = records.len(),
        fraud,
        clean = records.len() - fraud,
        "Records generated"
    );

    dataset::write_dataset_file(output, &records)?;
    info!(output = %output, "Dataset written");

    Ok(())
}
