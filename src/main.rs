//! AMM Fraud Detection Service - Main Entry Point
//!
//! Loads the pre-trained classifier and serves fraud verdicts for
//! pharmaceutical market-authorization records over HTTP.

use amm_fraud_pipeline::{
    config::AppConfig,
    extractor::DocumentFieldExtractor,
    features::FeatureEngineer,
    metrics::{MetricsReporter, ServiceMetrics},
    scorer::ModelScorer,
    server::{create_router, AppState},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("amm_fraud_pipeline=info".parse()?),
        )
        .init();

    info!("Starting AMM Fraud Detection Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        median_batch_size = config.features.median_batch_size,
        manufacturers = config.features.manufacturers.len(),
        threshold = config.model.threshold,
        "Configuration loaded"
    );

    // Shared feature constants flow into both the engineer and the scorer
    let engineer = FeatureEngineer::new(&config.features);
    info!(
        features = engineer.feature_count(),
        "Feature engineer initialized"
    );

    let scorer = ModelScorer::new(&config.features, &config.model)
        .context("Failed to initialize classifier")?;

    let extractor = DocumentFieldExtractor::new()?;

    let metrics = Arc::new(ServiceMetrics::new());

    // Periodic metrics summary
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    let state = AppState {
        scorer: Arc::new(scorer),
        engineer,
        extractor: Arc::new(extractor),
        metrics,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on http://{addr}");
    info!("POST records to /predict, document text to /validate_amm");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
