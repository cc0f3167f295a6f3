//! Stage-level command execution.
//!
//! The single place where external-process failure is converted into the
//! pipeline's error vocabulary. Stages hand over an argument vector, a
//! stage name, a hard timeout, and the failure code to use; they get back
//! captured stdout or a classified `PipelineFailure`.

use restore_media::{run_tool, MediaError, ToolCommand};
use restore_models::ErrorCode;

use crate::error::{PipelineFailure, PipelineResult};
use crate::joblog::JobLog;

/// Run one stage's external process to completion or timeout.
///
/// On timeout the process is killed and the failure carries the given code
/// with a timeout message; on non-zero exit the process's diagnostics are
/// folded into the log (lossy decoding, never a decode error). On success
/// the captured stdout is returned for stages that parse it.
pub async fn run_stage(
    log: &mut JobLog,
    cmd: &ToolCommand,
    stage: &str,
    timeout_secs: u64,
    code: ErrorCode,
) -> PipelineResult<Vec<u8>> {
    log.push(format!("Running {}", stage));
    match run_tool(cmd, timeout_secs).await {
        Ok(output) => Ok(output.stdout),
        Err(err) => Err(classify(log, stage, code, "Processing failed", err)),
    }
}

/// Convert a media-layer error into a classified pipeline failure. Shared
/// by `run_stage` and the stages that go through the media crate's own
/// wrappers (probe, interlace detection). `message` is the failure payload
/// message for non-timeout errors; timeouts always report "Stage timeout".
pub fn classify(
    log: &mut JobLog,
    stage: &str,
    code: ErrorCode,
    message: &str,
    err: MediaError,
) -> PipelineFailure {
    match err {
        MediaError::Timeout(_) => {
            log.push(format!("Timeout in {}", stage));
            PipelineFailure::raise(code, "Stage timeout", log)
        }
        MediaError::ToolFailed { stderr, .. } => {
            log.push(format!("{} failed: {}", stage, stderr));
            PipelineFailure::raise(code, message, log)
        }
        other => {
            log.push(format!("{} failed: {}", stage, other));
            PipelineFailure::raise(code, message, log)
        }
    }
}
