//! Document field extraction from authorization-document text.
//!
//! Pulls the raw record fields out of the text of an AMM attestation via
//! labeled-field patterns. PDF-to-text conversion happens outside this crate;
//! this boundary receives the already-extracted text.

use crate::error::{PipelineError, PipelineResult};
use crate::types::RawRecord;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::str::FromStr;

/// Extracts a [`RawRecord`] from authorization-document text.
///
/// Field labels follow the attestation layout ("Numéro AMM:", "Médicament:",
/// ...). Any missing or unparseable field surfaces as `InvalidInput` before
/// the record reaches the feature engineer.
pub struct DocumentFieldExtractor {
    amm_number: Regex,
    product_name: Regex,
    manufacturer: Regex,
    submission_date: Regex,
    approval_date: Regex,
    participants: Regex,
    side_effects: Regex,
    batch_size: Regex,
    price_per_unit: Regex,
    production_cost: Regex,
}

impl DocumentFieldExtractor {
    pub fn new() -> Result<Self> {
        let pattern = |re: &str| Regex::new(re).context("Failed to compile field pattern");

        Ok(Self {
            amm_number: pattern(r"Numéro AMM:\s*([A-Z0-9-]+)")?,
            product_name: pattern(r"Médicament:\s*([^\n]+)")?,
            manufacturer: pattern(r"Fabricant:\s*([^\n]+)")?,
            submission_date: pattern(r"Date Soumission:\s*(\d{4}-\d{2}-\d{2})")?,
            approval_date: pattern(r"Date Approbation:\s*(\d{4}-\d{2}-\d{2})")?,
            participants: pattern(r"Participants Essais Cliniques:\s*(\d+)")?,
            side_effects: pattern(r"Effets Secondaires Signalés:\s*(\d+)")?,
            batch_size: pattern(r"Taille de Lot:\s*(\d+)")?,
            price_per_unit: pattern(r"Prix Unitaire:\s*([0-9]+(?:\.[0-9]+)?)")?,
            production_cost: pattern(r"Coût de Production:\s*([0-9]+(?:\.[0-9]+)?)")?,
        })
    }

    /// Extract all record fields from document text.
    pub fn extract(&self, text: &str) -> PipelineResult<RawRecord> {
        Ok(RawRecord {
            amm_number: self.capture(&self.amm_number, "Numéro AMM", text)?,
            product_name: self.capture(&self.product_name, "Médicament", text)?,
            manufacturer: self.capture(&self.manufacturer, "Fabricant", text)?,
            submission_date: self.parse_field(&self.submission_date, "Date Soumission", text)?,
            approval_date: self.parse_field(&self.approval_date, "Date Approbation", text)?,
            clinical_trial_participants: self.parse_field(
                &self.participants,
                "Participants Essais Cliniques",
                text,
            )?,
            reported_side_effects: self.parse_field(
                &self.side_effects,
                "Effets Secondaires Signalés",
                text,
            )?,
            batch_size: self.parse_field(&self.batch_size, "Taille de Lot", text)?,
            price_per_unit: self.parse_field(&self.price_per_unit, "Prix Unitaire", text)?,
            production_cost: self.parse_field(
                &self.production_cost,
                "Coût de Production",
                text,
            )?,
        })
    }

    fn capture(&self, pattern: &Regex, label: &str, text: &str) -> PipelineResult<String> {
        pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .ok_or_else(|| PipelineError::invalid_input(format!("missing field '{label}'")))
    }

    fn parse_field<T>(&self, pattern: &Regex, label: &str, text: &str) -> PipelineResult<T>
    where
        T: ParseField,
    {
        let raw = self.capture(pattern, label, text)?;
        T::parse(&raw)
            .ok_or_else(|| PipelineError::invalid_input(format!("unparseable field '{label}'")))
    }
}

/// Field-specific string parsing for extracted values.
trait ParseField: Sized {
    fn parse(raw: &str) -> Option<Self>;
}

impl ParseField for NaiveDate {
    fn parse(raw: &str) -> Option<Self> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

impl ParseField for u32 {
    fn parse(raw: &str) -> Option<Self> {
        u32::from_str(raw).ok()
    }
}

impl ParseField for f64 {
    fn parse(raw: &str) -> Option<Self> {
        f64::from_str(raw).ok()
    }
}
