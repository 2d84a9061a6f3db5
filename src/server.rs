//! HTTP facade for the fraud detection service.
//!
//! Orchestrates extractor → feature engineer → classifier and serializes the
//! verdict. Transport only; all decision logic lives in the scorer seam.

use crate::error::PipelineError;
use crate::extractor::DocumentFieldExtractor;
use crate::features::FeatureEngineer;
use crate::metrics::ServiceMetrics;
use crate::scorer::Scorer;
use crate::types::{FraudVerdict, RawRecord, RuleTag};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<dyn Scorer>,
    pub engineer: FeatureEngineer,
    pub extractor: Arc<DocumentFieldExtractor>,
    pub metrics: Arc<ServiceMetrics>,
}

/// Build the service router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/validate_amm", post(validate_amm))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Error surface of the HTTP layer
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    Upstream(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            PipelineError::UpstreamUnavailable(msg) => ApiError::Upstream(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::Upstream(msg) => {
                tracing::error!("Upstream failure: {msg}");
                "upstream collaborator unavailable".to_string()
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    api_version: &'static str,
}

/// Verify the full scoring path with a fixed dummy record
async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let dummy = RawRecord {
        amm_number: "TEST123".to_string(),
        product_name: "HealthCheck".to_string(),
        manufacturer: "PharmaCorp".to_string(),
        submission_date: date(2023, 1, 1),
        approval_date: date(2023, 2, 1),
        clinical_trial_participants: 1000,
        reported_side_effects: 50,
        batch_size: 100_000,
        price_per_unit: 10.0,
        production_cost: 5.0,
    };

    state.scorer.score(&dummy)?;

    Ok(Json(HealthResponse {
        status: "healthy",
        model_loaded: true,
        api_version: env!("CARGO_PKG_VERSION"),
    }))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Headline engineered features echoed back with a verdict
#[derive(Serialize)]
pub struct FeatureSummary {
    approval_days: i64,
    price_ratio: f64,
    batch_variation: f64,
    is_fast_track: bool,
}

impl FeatureSummary {
    fn from_features(features: &[f32]) -> Self {
        Self {
            approval_days: features[0] as i64,
            price_ratio: round_to(features[1] as f64, 10.0),
            batch_variation: round_to(features[2] as f64, 100.0),
            is_fast_track: features[3] == 1.0,
        }
    }
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

#[derive(Serialize)]
pub struct PredictResponse {
    analysis_id: String,
    status: &'static str,
    probability: f64,
    triggered_rules: Vec<&'static str>,
    engineered_features: FeatureSummary,
}

impl PredictResponse {
    fn new(verdict: &FraudVerdict, features: &[f32]) -> Self {
        Self {
            analysis_id: uuid::Uuid::new_v4().to_string(),
            status: if verdict.is_fraud { "FRAUD" } else { "VALID" },
            probability: verdict.probability,
            triggered_rules: verdict
                .triggered_rules
                .iter()
                .map(RuleTag::as_str)
                .collect(),
            engineered_features: FeatureSummary::from_features(features),
        }
    }
}

/// Score a structured record
async fn predict(
    State(state): State<AppState>,
    Json(record): Json<RawRecord>,
) -> Result<Json<PredictResponse>, ApiError> {
    let start = Instant::now();

    let response = score_record(&state, &record).inspect_err(|e| {
        if matches!(e, ApiError::InvalidInput(_)) {
            state.metrics.record_invalid_input();
        }
    })?;

    state.metrics.record_prediction(
        start.elapsed(),
        response.probability,
        response.status == "FRAUD",
    );

    info!(
        amm_number = %record.amm_number,
        status = response.status,
        probability = response.probability,
        "Record scored"
    );

    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct ValidateRequest {
    /// Text extracted from an authorization PDF
    pub document_text: String,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    #[serde(flatten)]
    pub verdict: PredictResponse,
    pub extracted_data: RawRecord,
}

/// Extract fields from document text, then score the record
async fn validate_amm(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let start = Instant::now();

    let record = state
        .extractor
        .extract(&request.document_text)
        .inspect_err(|_| state.metrics.record_invalid_input())?;

    let verdict = score_record(&state, &record).inspect_err(|e| {
        if matches!(e, ApiError::InvalidInput(_)) {
            state.metrics.record_invalid_input();
        }
    })?;

    state.metrics.record_prediction(
        start.elapsed(),
        verdict.probability,
        verdict.status == "FRAUD",
    );

    info!(
        amm_number = %record.amm_number,
        status = verdict.status,
        "Document validated"
    );

    Ok(Json(ValidateResponse {
        verdict,
        extracted_data: record,
    }))
}

fn score_record(state: &AppState, record: &RawRecord) -> Result<PredictResponse, ApiError> {
    let features = state.engineer.engineer(record)?;
    let verdict = state.scorer.score(record)?;
    Ok(PredictResponse::new(&verdict, &features))
}
