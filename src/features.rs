//! Feature engineering for AMM fraud classifier inference.
//!
//! This module derives the numeric feature vector from a raw authorization
//! record. The transform must stay byte-for-byte consistent with the one used
//! when the training dataset was generated; both sides share a single
//! [`FeatureConfig`](crate::config::FeatureConfig) for that reason.

use crate::config::FeatureConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::rules::FAST_APPROVAL_DAYS;
use crate::types::RawRecord;

/// Result of matching a manufacturer against the configured enumeration.
///
/// An unrecognized manufacturer is a named code path, not an error: it
/// encodes as an all-zero one-hot sub-vector, matching how the model was
/// trained on out-of-enumeration names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManufacturerEncoding {
    /// Index into the configured manufacturer list
    Known(usize),
    /// Not in the enumeration; all-zero one-hot
    Other,
}

/// Transforms raw records into model input features.
///
/// Features are produced in the exact order expected by the classifier.
/// Deterministic, no side effects.
#[derive(Debug, Clone)]
pub struct FeatureEngineer {
    median_batch_size: f64,
    manufacturers: Vec<String>,
}

impl FeatureEngineer {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            median_batch_size: config.median_batch_size,
            manufacturers: config.manufacturers.clone(),
        }
    }

    /// Engineer the feature vector for one record.
    ///
    /// Order: approval_time_days, price_to_cost_ratio, batch_size_variation,
    /// fast_approval_flag, clinical_trial_participants,
    /// reported_side_effects, then one manufacturer one-hot entry per
    /// configured manufacturer.
    ///
    /// Fails atomically with `InvalidInput` on a negative approval time or a
    /// zero production cost; no partial vector is ever returned.
    pub fn engineer(&self, record: &RawRecord) -> PipelineResult<Vec<f32>> {
        let approval_days = record.approval_time_days();
        if approval_days < 0 {
            return Err(PipelineError::invalid_input(format!(
                "approval_date precedes submission_date by {} days",
                -approval_days
            )));
        }

        if record.production_cost <= 0.0 {
            return Err(PipelineError::invalid_input(
                "production_cost must be positive",
            ));
        }

        let mut features = Vec::with_capacity(self.feature_count());

        features.push(approval_days as f32);
        features.push((record.price_per_unit / record.production_cost) as f32);
        features.push((record.batch_size as f64 / self.median_batch_size) as f32);
        features.push(if approval_days < FAST_APPROVAL_DAYS {
            1.0
        } else {
            0.0
        });
        features.push(record.clinical_trial_participants as f32);
        features.push(record.reported_side_effects as f32);

        let encoding = self.encode_manufacturer(&record.manufacturer);
        for index in 0..self.manufacturers.len() {
            features.push(match encoding {
                ManufacturerEncoding::Known(i) if i == index => 1.0,
                _ => 0.0,
            });
        }

        Ok(features)
    }

    /// Match a manufacturer name against the configured enumeration.
    pub fn encode_manufacturer(&self, name: &str) -> ManufacturerEncoding {
        match self.manufacturers.iter().position(|m| m == name) {
            Some(index) => ManufacturerEncoding::Known(index),
            None => ManufacturerEncoding::Other,
        }
    }

    /// Number of features produced.
    pub fn feature_count(&self) -> usize {
        6 + self.manufacturers.len()
    }

    /// Feature names in output order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = vec![
            "approval_time_days".to_string(),
            "price_to_cost_ratio".to_string(),
            "batch_size_variation".to_string(),
            "fast_approval_flag".to_string(),
            "clinical_trial_participants".to_string(),
            "reported_side_effects".to_string(),
        ];
        for manufacturer in &self.manufacturers {
            names.push(format!("manufacturer_{manufacturer}"));
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn engineer() -> FeatureEngineer {
        FeatureEngineer::new(&FeatureConfig::default())
    }

    fn record() -> RawRecord {
        RawRecord {
            amm_number: "AMM-2023-001".to_string(),
            product_name: "CardioPlus".to_string(),
            manufacturer: "HealthGen".to_string(),
            submission_date: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
            approval_date: NaiveDate::from_ymd_opt(2023, 5, 2).unwrap(),
            clinical_trial_participants: 1200,
            reported_side_effects: 40,
            batch_size: 124_600,
            price_per_unit: 50.0,
            production_cost: 10.0,
        }
    }

    #[test]
    fn test_feature_order_and_values() {
        let features = engineer().engineer(&record()).unwrap();

        assert_eq!(features.len(), 11);
        assert_eq!(features[0], 90.0); // approval_time_days
        assert_eq!(features[1], 5.0); // price_to_cost_ratio
        assert_eq!(features[2], 1.0); // batch_size_variation at the median
        assert_eq!(features[3], 0.0); // not fast-tracked
        assert_eq!(features[4], 1200.0);
        assert_eq!(features[5], 40.0);
        // HealthGen is index 2 of the enumeration
        assert_eq!(&features[6..], &[0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_deterministic() {
        let eng = engineer();
        let rec = record();
        assert_eq!(eng.engineer(&rec).unwrap(), eng.engineer(&rec).unwrap());
    }

    #[test]
    fn test_fast_approval_boundary() {
        let mut rec = record();
        rec.approval_date = rec.submission_date + chrono::Days::new(29);
        assert_eq!(engineer().engineer(&rec).unwrap()[3], 1.0);

        rec.approval_date = rec.submission_date + chrono::Days::new(30);
        assert_eq!(engineer().engineer(&rec).unwrap()[3], 0.0);
    }

    #[test]
    fn test_onehot_sums_to_one_for_each_known_manufacturer() {
        let eng = engineer();
        for name in &FeatureConfig::default().manufacturers {
            let mut rec = record();
            rec.manufacturer = name.clone();
            let features = eng.engineer(&rec).unwrap();
            let sum: f32 = features[6..].iter().sum();
            assert_eq!(sum, 1.0, "one-hot must sum to 1 for {name}");
        }
    }

    #[test]
    fn test_unknown_manufacturer_encodes_all_zero() {
        let mut rec = record();
        rec.manufacturer = "LABORATOIRES ZENITH".to_string();

        assert_eq!(
            engineer().encode_manufacturer(&rec.manufacturer),
            ManufacturerEncoding::Other
        );
        let features = engineer().engineer(&rec).unwrap();
        let sum: f32 = features[6..].iter().sum();
        assert_eq!(sum, 0.0);
    }

    #[test]
    fn test_negative_approval_time_rejected() {
        let mut rec = record();
        rec.approval_date = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();

        let err = engineer().engineer(&rec).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_zero_production_cost_rejected() {
        let mut rec = record();
        rec.production_cost = 0.0;

        let err = engineer().engineer(&rec).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_feature_names_match_count() {
        let eng = engineer();
        assert_eq!(eng.feature_names().len(), eng.feature_count());
        assert_eq!(eng.feature_names()[6], "manufacturer_BioPharm Solutions");
    }
}
