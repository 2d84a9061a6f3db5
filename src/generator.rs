//! Synthetic AMM record generation for offline classifier training.
//!
//! Records are drawn from one of two templates (fraud-shaped or normal) and
//! then re-scored through the rule labeler; the persisted verdict is always
//! the labeler's, so a template's intent and the final label may disagree at
//! the margins. That disagreement is accepted, not corrected.

use crate::config::FeatureConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::rules::RuleLabeler;
use crate::types::{LabeledRecord, RawRecord};
use chrono::{Days, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const PRODUCT_NAMES: &[&str] = &[
    "MediSafeX",
    "QuickHeal",
    "PainAway",
    "FlexiJoint",
    "CardioPlus",
];

/// Batch sizes drawn by the fraud template, all under the small-batch rule
/// threshold.
const SMALL_BATCH_SIZES: &[u32] = &[10_000, 20_000, 30_000, 40_000];

/// Batch sizes drawn by the normal template.
const LARGE_BATCH_SIZES: &[u32] = &[100_000, 150_000, 200_000, 250_000];

/// First day of the calendar window submission dates are drawn from.
const WINDOW_START: (i32, u32, u32) = (2023, 1, 1);

/// Width of the submission-date window in days.
const WINDOW_DAYS: u64 = 180;

/// Generates randomized raw records, labeled by the heuristic rules.
pub struct SyntheticGenerator {
    manufacturers: Vec<String>,
    labeler: RuleLabeler,
}

impl SyntheticGenerator {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            manufacturers: config.manufacturers.clone(),
            labeler: RuleLabeler::new(),
        }
    }

    /// Generate `count` labeled records, drawing the fraud template with
    /// probability `fraud_rate`.
    ///
    /// With a fixed `seed` the output is bit-reproducible; without one each
    /// call draws from OS entropy.
    pub fn generate(
        &self,
        count: usize,
        fraud_rate: f64,
        seed: Option<u64>,
    ) -> PipelineResult<Vec<LabeledRecord>> {
        if !(0.0..=1.0).contains(&fraud_rate) {
            return Err(PipelineError::invalid_input(format!(
                "fraud_rate {fraud_rate} outside [0, 1]"
            )));
        }

        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut records = Vec::with_capacity(count);
        for i in 1..=count {
            let record = if rng.gen_bool(fraud_rate) {
                self.fraud_record(i, &mut rng)
            } else {
                self.normal_record(i, &mut rng)
            };
            let verdict = self.labeler.label(&record)?;
            records.push(LabeledRecord { record, verdict });
        }

        Ok(records)
    }

    /// Fraud-shaped template: rushed approval, small under-powered trial,
    /// elevated side effects, small batches, steep markup.
    fn fraud_record(&self, index: usize, rng: &mut ChaCha8Rng) -> RawRecord {
        let approval_days: u64 = rng.gen_range(1..=14);
        let participants: u32 = rng.gen_range(150..=500);
        let side_effects = (participants as f64 * rng.gen_range(0.15..0.30)) as u32;
        let batch_size = choose(SMALL_BATCH_SIZES, rng);
        let production_cost = round_cents(rng.gen_range(2.0..5.0));
        let price_per_unit = round_cents(production_cost * rng.gen_range(15.0..30.0));

        self.record(
            index,
            rng,
            approval_days,
            participants,
            side_effects,
            batch_size,
            price_per_unit,
            production_cost,
        )
    }

    /// Normal template: unremarkable timelines, adequately powered trial,
    /// ordinary pricing.
    fn normal_record(&self, index: usize, rng: &mut ChaCha8Rng) -> RawRecord {
        let approval_days: u64 = rng.gen_range(60..=180);
        let participants: u32 = rng.gen_range(800..=2000);
        let side_effects = rng.gen_range(5.0..participants as f64 * 0.1) as u32;
        let batch_size = choose(LARGE_BATCH_SIZES, rng);
        let production_cost = round_cents(rng.gen_range(5.0..15.0));
        let price_per_unit = round_cents(production_cost * rng.gen_range(3.0..8.0));

        self.record(
            index,
            rng,
            approval_days,
            participants,
            side_effects,
            batch_size,
            price_per_unit,
            production_cost,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        index: usize,
        rng: &mut ChaCha8Rng,
        approval_days: u64,
        participants: u32,
        side_effects: u32,
        batch_size: u32,
        price_per_unit: f64,
        production_cost: f64,
    ) -> RawRecord {
        let submission_date = window_start() + Days::new(rng.gen_range(0..=WINDOW_DAYS));

        RawRecord {
            amm_number: format!("AMM-2023-{index:03}"),
            product_name: choose(PRODUCT_NAMES, rng).to_string(),
            manufacturer: self.manufacturers[rng.gen_range(0..self.manufacturers.len())].clone(),
            submission_date,
            approval_date: submission_date + Days::new(approval_days),
            clinical_trial_participants: participants,
            reported_side_effects: side_effects,
            batch_size,
            price_per_unit,
            production_cost,
        }
    }
}

fn window_start() -> NaiveDate {
    let (year, month, day) = WINDOW_START;
    NaiveDate::from_ymd_opt(year, month, day).expect("window start is a valid calendar date")
}

fn choose<T: Copy>(values: &[T], rng: &mut ChaCha8Rng) -> T {
    values[rng.gen_range(0..values.len())]
}

/// Round a monetary value to whole cents, matching the persisted format.
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
