//! Heuristic rule-based fraud labeling.
//!
//! Used only when building synthetic training datasets, never at live
//! inference time; the classifier is the inference-side decision procedure.

use crate::error::{PipelineError, PipelineResult};
use crate::types::{FraudVerdict, RawRecord, RuleTag};
use std::collections::BTreeSet;

/// Approvals faster than this many days are suspicious. Shared with the
/// feature engineer's fast_approval_flag.
pub const FAST_APPROVAL_DAYS: i64 = 30;

/// Price-to-cost ratios above this value are suspicious markups.
pub const HIGH_MARKUP_RATIO: f64 = 10.0;

/// Side-effect to participant ratios above this value are suspicious.
pub const HIGH_SIDE_EFFECT_RATIO: f64 = 0.15;

/// Batches smaller than this are suspicious for an approved product.
pub const SMALL_BATCH_SIZE: u32 = 50_000;

/// Trials smaller than this participant count are suspicious.
pub const SMALL_TRIAL_PARTICIPANTS: u32 = 500;

/// Labels records by evaluating all five heuristic rules independently.
///
/// Tags are collected as set membership, so evaluation order is irrelevant;
/// the record is fraudulent iff at least one rule fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleLabeler;

impl RuleLabeler {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every rule against the record and produce a verdict.
    ///
    /// Fails with `InvalidInput` when a ratio denominator is zero
    /// (production cost, trial participants) or the approval time is
    /// negative; no partial tag set is returned.
    pub fn label(&self, record: &RawRecord) -> PipelineResult<FraudVerdict> {
        let approval_days = record.approval_time_days();
        if approval_days < 0 {
            return Err(PipelineError::invalid_input(
                "approval_date precedes submission_date",
            ));
        }
        if record.production_cost <= 0.0 {
            return Err(PipelineError::invalid_input(
                "production_cost must be positive",
            ));
        }
        if record.clinical_trial_participants == 0 {
            return Err(PipelineError::invalid_input(
                "clinical_trial_participants must be non-zero",
            ));
        }

        let mut tags = BTreeSet::new();

        if approval_days < FAST_APPROVAL_DAYS {
            tags.insert(RuleTag::FastApproval);
        }

        if record.price_per_unit / record.production_cost > HIGH_MARKUP_RATIO {
            tags.insert(RuleTag::HighMarkup);
        }

        let side_effect_ratio =
            record.reported_side_effects as f64 / record.clinical_trial_participants as f64;
        if side_effect_ratio > HIGH_SIDE_EFFECT_RATIO {
            tags.insert(RuleTag::HighSideEffects);
        }

        if record.batch_size < SMALL_BATCH_SIZE {
            tags.insert(RuleTag::SmallBatch);
        }

        if record.clinical_trial_participants < SMALL_TRIAL_PARTICIPANTS {
            tags.insert(RuleTag::SmallTrial);
        }

        Ok(FraudVerdict::from_rules(tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record_with_days(approval_days: u64) -> RawRecord {
        let submission = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        RawRecord {
            amm_number: "AMM-2023-010".to_string(),
            product_name: "QuickHeal".to_string(),
            manufacturer: "MediVita".to_string(),
            submission_date: submission,
            approval_date: submission + chrono::Days::new(approval_days),
            clinical_trial_participants: 1000,
            reported_side_effects: 50,
            batch_size: 150_000,
            price_per_unit: 25.0,
            production_cost: 5.0,
        }
    }

    #[test]
    fn test_clean_record_has_no_tags() {
        // days=90, ratio=5, side_effects/participants=0.05, batch=150000,
        // participants=1000
        let verdict = RuleLabeler::new().label(&record_with_days(90)).unwrap();
        assert!(!verdict.is_fraud);
        assert!(verdict.triggered_rules.is_empty());
    }

    #[test]
    fn test_fast_approval_fires_independently() {
        let mut rec = record_with_days(10);
        rec.price_per_unit = 10.0; // ratio 2
        rec.batch_size = 200_000;
        rec.clinical_trial_participants = 2000;
        rec.reported_side_effects = 100;

        let verdict = RuleLabeler::new().label(&rec).unwrap();
        assert!(verdict.is_fraud);
        assert_eq!(
            verdict.triggered_rules.into_iter().collect::<Vec<_>>(),
            vec![RuleTag::FastApproval]
        );
    }

    #[test]
    fn test_fast_approval_boundary() {
        let labeler = RuleLabeler::new();
        let verdict = labeler.label(&record_with_days(29)).unwrap();
        assert!(verdict.triggered_rules.contains(&RuleTag::FastApproval));

        let verdict = labeler.label(&record_with_days(30)).unwrap();
        assert!(!verdict.triggered_rules.contains(&RuleTag::FastApproval));
    }

    #[test]
    fn test_high_markup_fires_alone() {
        let mut rec = record_with_days(90);
        rec.price_per_unit = 75.0; // ratio 15

        let verdict = RuleLabeler::new().label(&rec).unwrap();
        assert!(verdict.is_fraud);
        assert_eq!(
            verdict.triggered_rules.into_iter().collect::<Vec<_>>(),
            vec![RuleTag::HighMarkup]
        );
    }

    #[test]
    fn test_high_side_effects() {
        let mut rec = record_with_days(90);
        rec.reported_side_effects = 200; // ratio 0.2

        let verdict = RuleLabeler::new().label(&rec).unwrap();
        assert!(verdict.triggered_rules.contains(&RuleTag::HighSideEffects));
    }

    #[test]
    fn test_small_batch_and_small_trial() {
        let mut rec = record_with_days(90);
        rec.batch_size = 40_000;
        rec.clinical_trial_participants = 400;
        rec.reported_side_effects = 20;

        let verdict = RuleLabeler::new().label(&rec).unwrap();
        assert!(verdict.triggered_rules.contains(&RuleTag::SmallBatch));
        assert!(verdict.triggered_rules.contains(&RuleTag::SmallTrial));
        assert_eq!(verdict.triggered_rules.len(), 2);
    }

    #[test]
    fn test_zero_participants_rejected() {
        let mut rec = record_with_days(90);
        rec.clinical_trial_participants = 0;

        let err = RuleLabeler::new().label(&rec).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let mut rec = record_with_days(90);
        rec.approval_date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

        let err = RuleLabeler::new().label(&rec).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }
}
