//! Error taxonomy for the AMM fraud pipeline.

use thiserror::Error;

/// Errors surfaced by the pipeline core.
///
/// `InvalidInput` covers malformed or semantically impossible records and is
/// always returned to the caller immediately, never retried or defaulted.
/// `UpstreamUnavailable` wraps collaborator failures (classifier runtime,
/// document extraction) and is propagated unchanged.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl PipelineError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    pub fn upstream(source: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(source.into())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
