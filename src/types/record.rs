//! Raw AMM record structures for pharmaceutical fraud detection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unvalidated description of one AMM (market-authorization) submission.
///
/// This is the unit of analysis: the administrative and production attributes
/// of a single pharmaceutical authorization document, either extracted from a
/// scanned PDF or synthesized for training. Records are value objects and are
/// never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Free-form authorization identifier (e.g. "AMM-2023-042")
    pub amm_number: String,

    /// Commercial product name
    pub product_name: String,

    /// Manufacturer name; matched against the configured enumeration at
    /// one-hot encoding time
    pub manufacturer: String,

    /// Date the authorization request was submitted
    pub submission_date: NaiveDate,

    /// Date the authorization was granted
    pub approval_date: NaiveDate,

    /// Number of clinical trial participants
    pub clinical_trial_participants: u32,

    /// Reported side effects, semantically bounded by participants
    pub reported_side_effects: u32,

    /// Production batch size in units
    pub batch_size: u32,

    /// Sale price per unit
    pub price_per_unit: f64,

    /// Production cost per unit; division denominator, must be non-zero
    pub production_cost: f64,
}

impl RawRecord {
    /// Whole days between submission and approval. Negative when the dates
    /// are inverted; callers treat that as invalid input.
    pub fn approval_time_days(&self) -> i64 {
        (self.approval_date - self.submission_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawRecord {
        RawRecord {
            amm_number: "AMM-2023-999".to_string(),
            product_name: "FlexiJoint".to_string(),
            manufacturer: "PharmaCorp".to_string(),
            submission_date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            approval_date: NaiveDate::from_ymd_opt(2023, 7, 15).unwrap(),
            clinical_trial_participants: 800,
            reported_side_effects: 30,
            batch_size: 150_000,
            price_per_unit: 150.50,
            production_cost: 12.75,
        }
    }

    #[test]
    fn test_approval_time_days() {
        assert_eq!(sample().approval_time_days(), 75);
    }

    #[test]
    fn test_record_serialization() {
        let record = sample();

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"submission_date\":\"2023-05-01\""));

        let deserialized: RawRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }
}
