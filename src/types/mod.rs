//! Type definitions for the AMM fraud pipeline

pub mod record;
pub mod verdict;

pub use record::RawRecord;
pub use verdict::{FraudVerdict, LabeledRecord, RuleTag};
