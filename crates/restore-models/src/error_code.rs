//! Fixed failure taxonomy for the restoration pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic failure codes, one per failure class.
///
/// Every stage failure carries exactly one of these; the code is serialized
/// verbatim into the failure payload's `error_code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Request failed structural or range validation (also: input too large)
    #[serde(rename = "ERR_VALIDATION")]
    Validation,
    /// Source download failed
    #[serde(rename = "ERR_INPUT_DOWNLOAD")]
    InputDownload,
    /// ffprobe failed or produced unparsable output
    #[serde(rename = "ERR_INPUT_PROBE")]
    InputProbe,
    /// Deinterlace detection or the deinterlace fallback pass failed
    #[serde(rename = "ERR_DEINTERLACE")]
    Deinterlace,
    /// The combined preprocess/exposure filter pass failed
    #[serde(rename = "ERR_EXPOSURE")]
    Exposure,
    /// Reserved for a standalone denoise pass; the current pipeline folds
    /// denoise into the preprocess chain, which reports under `Exposure`
    #[serde(rename = "ERR_DENOISE")]
    Denoise,
    /// Super-resolution upscale failed
    #[serde(rename = "ERR_UPSCALE")]
    Upscale,
    /// Encode (or audio extraction feeding it) failed
    #[serde(rename = "ERR_ENCODE")]
    Encode,
    /// Delivery upload or presigning failed
    #[serde(rename = "ERR_UPLOAD")]
    Upload,
    /// The job-wide wall-clock budget was exceeded, or a stage timed out
    #[serde(rename = "ERR_TIMEOUT")]
    Timeout,
    /// Catch-all for unclassified faults
    #[serde(rename = "ERR_INTERNAL")]
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "ERR_VALIDATION",
            Self::InputDownload => "ERR_INPUT_DOWNLOAD",
            Self::InputProbe => "ERR_INPUT_PROBE",
            Self::Deinterlace => "ERR_DEINTERLACE",
            Self::Exposure => "ERR_EXPOSURE",
            Self::Denoise => "ERR_DENOISE",
            Self::Upscale => "ERR_UPSCALE",
            Self::Encode => "ERR_ENCODE",
            Self::Upload => "ERR_UPLOAD",
            Self::Timeout => "ERR_TIMEOUT",
            Self::Internal => "ERR_INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
