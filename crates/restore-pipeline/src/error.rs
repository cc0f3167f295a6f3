//! Classified pipeline failures.

use thiserror::Error;

use restore_models::ErrorCode;

use crate::joblog::JobLog;

pub type PipelineResult<T> = Result<T, PipelineFailure>;

/// A classified stage failure.
///
/// Carries one code from the fixed taxonomy, a short human-readable
/// message, and the full log accumulated up to the failure point. Raised by
/// any stage and propagated unchanged to the caller; the only downgrade is
/// the audio-extraction degrade-and-continue case, which the orchestrator
/// handles explicitly.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct PipelineFailure {
    pub code: ErrorCode,
    pub message: String,
    pub logs: Vec<String>,
}

impl PipelineFailure {
    /// Raise a failure carrying a snapshot of the log so far.
    pub fn raise(code: ErrorCode, message: impl Into<String>, log: &JobLog) -> Self {
        Self {
            code,
            message: message.into(),
            logs: log.snapshot(),
        }
    }
}
