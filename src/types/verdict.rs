//! Fraud verdict data structures

use crate::types::record::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Heuristic rule identifiers recorded as evidence on a verdict.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RuleTag {
    FastApproval,
    HighMarkup,
    HighSideEffects,
    SmallBatch,
    SmallTrial,
}

impl RuleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleTag::FastApproval => "fast_approval",
            RuleTag::HighMarkup => "high_markup",
            RuleTag::HighSideEffects => "high_side_effects",
            RuleTag::SmallBatch => "small_batch",
            RuleTag::SmallTrial => "small_trial",
        }
    }
}

impl fmt::Display for RuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast_approval" => Ok(RuleTag::FastApproval),
            "high_markup" => Ok(RuleTag::HighMarkup),
            "high_side_effects" => Ok(RuleTag::HighSideEffects),
            "small_batch" => Ok(RuleTag::SmallBatch),
            "small_trial" => Ok(RuleTag::SmallTrial),
            other => Err(format!("unknown rule tag '{other}'")),
        }
    }
}

/// Fraud verdict for one record: a boolean decision plus supporting evidence.
///
/// Produced either by the heuristic rule labeler (when building synthetic
/// training data) or by the pre-trained classifier (at inference time). The
/// two are distinct decision procedures over the same feature space; the
/// classifier never populates `triggered_rules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudVerdict {
    pub is_fraud: bool,

    /// Confidence in [0, 1]. Degenerate (0.0 or 1.0) for rule-based verdicts.
    pub probability: f64,

    /// Heuristic rules that fired, ordered set for stable serialization
    pub triggered_rules: BTreeSet<RuleTag>,
}

impl FraudVerdict {
    /// Verdict backed by heuristic rule matches.
    pub fn from_rules(triggered_rules: BTreeSet<RuleTag>) -> Self {
        let is_fraud = !triggered_rules.is_empty();
        Self {
            is_fraud,
            probability: if is_fraud { 1.0 } else { 0.0 },
            triggered_rules,
        }
    }

    /// Verdict backed by a classifier probability and decision threshold.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        Self {
            is_fraud: probability >= threshold,
            probability,
            triggered_rules: BTreeSet::new(),
        }
    }
}

/// A generated record together with its persisted rule-based verdict; the
/// unit written to the training dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    pub record: RawRecord,
    pub verdict: FraudVerdict,
}
