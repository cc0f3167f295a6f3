//! Terminal job result payloads.

use serde::{Deserialize, Serialize};

use crate::ErrorCode;

/// The exposure triple actually applied by the pipeline, which may differ
/// from the caller's raw values when the auto-exposure nudge was requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedExposure {
    pub brightness: f64,
    pub gamma: f64,
    pub contrast: f64,
    pub auto_exposure: bool,
}

/// Derived metadata surfaced with a successful job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetadata {
    /// Source container duration in seconds (0.0 if unknown)
    pub duration_sec: f64,
    /// First video stream's WxH ("" if no video stream was reported)
    pub input_resolution: String,
    /// Resolved target resolution as WxH
    pub output_resolution: String,
    /// Verdict of the interlace detection pass
    pub interlace_detected: bool,
    /// Exposure values actually used downstream
    pub applied_exposure: AppliedExposure,
}

/// Terminal outcome of one restoration job.
///
/// Single-use: returned once to the caller, never mutated afterwards. The
/// log trail is surfaced verbatim in both variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Completed {
        output_url: String,
        metadata: JobMetadata,
        logs: Vec<String>,
    },
    Failed {
        error_code: ErrorCode,
        error_message: String,
        logs: Vec<String>,
    },
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn logs(&self) -> &[String] {
        match self {
            Self::Completed { logs, .. } => logs,
            Self::Failed { logs, .. } => logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_payload_shape() {
        let outcome = JobOutcome::Completed {
            output_url: "file:///out/final.mp4".to_string(),
            metadata: JobMetadata {
                duration_sec: 10.0,
                input_resolution: "720x480".to_string(),
                output_resolution: "2048x1080".to_string(),
                interlace_detected: true,
                applied_exposure: AppliedExposure {
                    brightness: 0.0,
                    gamma: 1.0,
                    contrast: 1.0,
                    auto_exposure: false,
                },
            },
            logs: vec!["line".to_string()],
        };

        let json: serde_json::Value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["metadata"]["output_resolution"], "2048x1080");
        assert_eq!(json["metadata"]["interlace_detected"], true);
    }

    #[test]
    fn test_failed_payload_shape() {
        let outcome = JobOutcome::Failed {
            error_code: ErrorCode::Upscale,
            error_message: "Processing failed".to_string(),
            logs: vec![],
        };

        let json: serde_json::Value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error_code"], "ERR_UPSCALE");
        assert!(!outcome.is_completed());
    }
}
