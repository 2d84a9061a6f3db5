//! Configuration management for the AMM fraud pipeline

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub features: FeatureConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// Classifier model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the pre-trained ONNX classifier
    pub path: String,
    /// Probability threshold for a FRAUD verdict
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Number of threads for ONNX intra-op parallelism (default: 1)
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

/// Shared feature-engineering constants.
///
/// These values are part of the model contract: the same `FeatureConfig` is
/// handed to the synthetic generator at training-data time and to the feature
/// engineer at inference time. Baking either value separately into two places
/// makes predictions drift silently.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureConfig {
    /// Median batch size of the training corpus, the normalization
    /// denominator for `batch_size_variation`
    #[serde(default = "default_median_batch_size")]
    pub median_batch_size: f64,
    /// Manufacturer enumeration for one-hot encoding. Order-sensitive.
    #[serde(default = "default_manufacturers")]
    pub manufacturers: Vec<String>,
}

fn default_threshold() -> f64 {
    0.5
}

fn default_intra_threads() -> usize {
    1
}

fn default_median_batch_size() -> f64 {
    124_600.0
}

fn default_manufacturers() -> Vec<String> {
    [
        "BioPharm Solutions",
        "CureAll",
        "HealthGen",
        "MediVita",
        "PharmaCorp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            model: ModelConfig {
                path: "models/amm.onnx".to_string(),
                threshold: default_threshold(),
                intra_threads: default_intra_threads(),
            },
            features: FeatureConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            median_batch_size: default_median_batch_size(),
            manufacturers: default_manufacturers(),
        }
    }
}
