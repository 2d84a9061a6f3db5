//! ONNX classifier loader

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Loaded ONNX classifier with resolved I/O names
pub struct LoadedModel {
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the feature tensor
    pub input_name: String,
    /// Output name for class probabilities
    pub output_name: String,
}

/// Loader for the pre-trained AMM classifier
pub struct ModelLoader {
    intra_threads: usize,
}

impl ModelLoader {
    /// Create a loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a loader with the given intra-op thread count
    pub fn with_threads(intra_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(intra_threads, "ONNX Runtime initialized");
        Ok(Self { intra_threads })
    }

    /// Load the classifier from an ONNX file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadedModel> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = self.intra_threads, "Loading classifier");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.intra_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load classifier from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // sklearn exports name the probability output "probabilities" or
        // "output_probability"; fall back to the last output otherwise
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            input = %input_name,
            output = %output_name,
            "Classifier loaded"
        );

        Ok(LoadedModel {
            session,
            input_name,
            output_name,
        })
    }
}
