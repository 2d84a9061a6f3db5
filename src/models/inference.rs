//! Classifier inference for AMM fraud detection.
//!
//! The model is an opaque pre-trained artifact; this module loads it and
//! turns a feature vector into a fraud probability. Runtime failures are
//! collaborator failures and surface as `UpstreamUnavailable`.

use crate::config::ModelConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::models::loader::{LoadedModel, ModelLoader};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Runs the pre-trained ONNX classifier over engineered feature vectors.
pub struct ClassifierEngine {
    // RwLock for interior mutability; Session::run needs &mut
    model: RwLock<LoadedModel>,
}

impl ClassifierEngine {
    /// Load the classifier described by the model configuration.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.intra_threads)?;
        let model = loader.load(&config.path)?;
        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Predict the fraud probability for one feature vector.
    pub fn predict(&self, features: &[f32]) -> PipelineResult<f64> {
        let mut model = self
            .model
            .write()
            .map_err(|e| PipelineError::upstream(format!("classifier lock poisoned: {e}")))?;

        run_model(&mut model, features)
            .map_err(|e| PipelineError::upstream(format!("classifier: {e:#}")))
    }
}

fn run_model(model: &mut LoadedModel, features: &[f32]) -> Result<f64> {
    let shape = vec![1_i64, features.len() as i64];
    let input_tensor =
        Tensor::from_array((shape, features.to_vec())).context("Failed to create input tensor")?;

    let input_name = model.input_name.clone();
    let output_name = model.output_name.clone();

    let outputs = model
        .session
        .run(ort::inputs![&input_name => input_tensor])?;

    probability_from_outputs(&outputs, &output_name)
}

/// Extract the fraud-class probability from the model outputs.
///
/// Handles both tensor outputs and the seq(map(int64, float)) shape produced
/// by sklearn ONNX exports.
fn probability_from_outputs(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
) -> Result<f64> {
    if let Some(output) = outputs.get(output_name) {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(fraud_prob_from_tensor(&dims, data));
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return probability_from_sequence(output);
        }
    }

    // The configured output name did not match; try every non-label output
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            debug!(output = %name, "Extracted probability from fallback output");
            return Ok(fraud_prob_from_tensor(&dims, data));
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            if let Ok(prob) = probability_from_sequence(&output) {
                return Ok(prob);
            }
        }
    }

    warn!("Could not extract a probability from any classifier output");
    anyhow::bail!("no probability output found")
}

/// Extract the class-1 probability from a seq(map(int64, float)) output.
fn probability_from_sequence(output: &DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {e}"))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let map_value = maps.first().context("empty probability sequence")?;

    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(*prob as f64);
        }
    }
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    anyhow::bail!("no class probability found in map output")
}

/// Pull the fraud-class probability out of raw tensor data.
fn fraud_prob_from_tensor(dims: &[i64], data: &[f32]) -> f64 {
    let classes = match dims {
        [_, classes] => *classes as usize,
        [classes] => *classes as usize,
        _ => 0,
    };

    let value = match classes {
        // [batch, classes] or [classes] with a fraud class at index 1
        n if n >= 2 => data.get(1).copied(),
        1 => data.first().copied(),
        _ => data.last().copied(),
    };

    value.map(|v| v as f64).unwrap_or(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_probability_two_classes() {
        // [1, 2] probability row: class 0 = 0.3, class 1 (fraud) = 0.7
        assert_eq!(fraud_prob_from_tensor(&[1, 2], &[0.3, 0.7]), 0.7_f32 as f64);
    }

    #[test]
    fn test_tensor_probability_single_column() {
        assert_eq!(fraud_prob_from_tensor(&[1, 1], &[0.9]), 0.9_f32 as f64);
    }

    #[test]
    fn test_tensor_probability_flat_shape() {
        assert_eq!(fraud_prob_from_tensor(&[2], &[0.4, 0.6]), 0.6_f32 as f64);
    }

    #[test]
    fn test_tensor_probability_empty_defaults_neutral() {
        assert_eq!(fraud_prob_from_tensor(&[], &[]), 0.5);
    }
}
