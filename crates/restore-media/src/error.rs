//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving external tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Upscaler not found in PATH")]
    UpscalerNotFound,

    #[error("{tool} exited with status {exit_code:?}")]
    ToolFailed {
        tool: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Probe output parse error: {0}")]
    ProbeParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a tool failure error with lossy-decoded diagnostics.
    pub fn tool_failed(tool: impl Into<String>, stderr: &[u8], exit_code: Option<i32>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
            exit_code,
        }
    }

    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed(message.into())
    }
}
