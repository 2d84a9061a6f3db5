//! Fraud scoring seam.
//!
//! Two decision procedures exist over the same record space: the heuristic
//! rule labeler (used to build synthetic training data) and the pre-trained
//! classifier (used at inference time). Both sit behind [`Scorer`] so callers
//! and tests can exercise either without conflating them.

use crate::config::{FeatureConfig, ModelConfig};
use crate::error::PipelineResult;
use crate::features::FeatureEngineer;
use crate::models::ClassifierEngine;
use crate::rules::RuleLabeler;
use crate::types::{FraudVerdict, RawRecord};
use anyhow::Result;

/// A fraud decision procedure over raw records.
pub trait Scorer: Send + Sync {
    fn score(&self, record: &RawRecord) -> PipelineResult<FraudVerdict>;
}

/// Heuristic decision procedure backed by the rule labeler.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleScorer {
    labeler: RuleLabeler,
}

impl RuleScorer {
    pub fn new() -> Self {
        Self {
            labeler: RuleLabeler::new(),
        }
    }
}

impl Scorer for RuleScorer {
    fn score(&self, record: &RawRecord) -> PipelineResult<FraudVerdict> {
        self.labeler.label(record)
    }
}

/// Model-backed decision procedure: feature engineering followed by
/// classifier inference against a probability threshold.
pub struct ModelScorer {
    engineer: FeatureEngineer,
    classifier: ClassifierEngine,
    threshold: f64,
}

impl ModelScorer {
    pub fn new(features: &FeatureConfig, model: &ModelConfig) -> Result<Self> {
        Ok(Self {
            engineer: FeatureEngineer::new(features),
            classifier: ClassifierEngine::new(model)?,
            threshold: model.threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Scorer for ModelScorer {
    fn score(&self, record: &RawRecord) -> PipelineResult<FraudVerdict> {
        let features = self.engineer.engineer(record)?;
        let probability = self.classifier.predict(&features)?;
        Ok(FraudVerdict::from_probability(probability, self.threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleTag;
    use chrono::NaiveDate;

    fn record() -> RawRecord {
        RawRecord {
            amm_number: "AMM-2023-007".to_string(),
            product_name: "PainAway".to_string(),
            manufacturer: "CureAll".to_string(),
            submission_date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            approval_date: NaiveDate::from_ymd_opt(2023, 4, 11).unwrap(),
            clinical_trial_participants: 2000,
            reported_side_effects: 100,
            batch_size: 200_000,
            price_per_unit: 10.0,
            production_cost: 5.0,
        }
    }

    #[test]
    fn test_rule_scorer_matches_labeler() {
        let scorer = RuleScorer::new();
        let verdict = scorer.score(&record()).unwrap();

        assert!(verdict.is_fraud);
        assert_eq!(
            verdict.triggered_rules.into_iter().collect::<Vec<_>>(),
            vec![RuleTag::FastApproval]
        );
    }

    #[test]
    fn test_scorer_is_object_safe() {
        let scorer: Box<dyn Scorer> = Box::new(RuleScorer::new());
        assert!(scorer.score(&record()).unwrap().is_fraud);
    }
}
