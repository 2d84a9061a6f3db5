//! AMM Fraud Detection Pipeline Library
//!
//! Flags potentially fraudulent pharmaceutical market-authorization (AMM)
//! documents: synthesizes labeled training data with engineered fraud
//! heuristics, extracts structured fields from authorization-document text,
//! re-derives the same features at inference time, and calls a pre-trained
//! classifier to emit a fraud verdict over HTTP.

pub mod config;
pub mod dataset;
pub mod error;
pub mod extractor;
pub mod features;
pub mod generator;
pub mod metrics;
pub mod models;
pub mod rules;
pub mod scorer;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::PipelineError;
pub use extractor::DocumentFieldExtractor;
pub use features::FeatureEngineer;
pub use generator::SyntheticGenerator;
pub use rules::RuleLabeler;
pub use scorer::{ModelScorer, RuleScorer, Scorer};
pub use types::{FraudVerdict, LabeledRecord, RawRecord, RuleTag};
