//! Interlace detection via a bounded idet sample pass.

use std::path::Path;

use crate::command::{run_tool, ToolCommand};
use crate::error::MediaResult;

/// Frames sampled by the detection pass. Enough for idet to settle on
/// telecined VHS captures without scanning the whole tape.
const SAMPLE_FRAMES: u32 = 300;

/// Hard ceiling for the detection pass.
const DETECT_TIMEOUT_SECS: u64 = 300;

/// Classify idet diagnostics: the source counts as interlaced when the
/// field-order summary reports TFF or BFF frames.
pub fn stderr_reports_interlace(stderr: &str) -> bool {
    stderr.contains("TFF") || stderr.contains("BFF")
}

/// Run a short idet analysis pass over the input and classify it as
/// interlaced or progressive.
///
/// The verdict only drives the deinterlace decision when the caller's mode
/// is `auto`; `on` and `off` override it unconditionally.
pub async fn detect_interlace(path: impl AsRef<Path>) -> MediaResult<bool> {
    let cmd = ToolCommand::new("ffmpeg")
        .args(["-i"])
        .arg(path.as_ref().to_string_lossy())
        .args(["-filter:v", "idet"])
        .arg("-frames:v")
        .arg(SAMPLE_FRAMES.to_string())
        .args(["-an", "-f", "rawvideo", "-y", "/dev/null"]);

    let output = run_tool(&cmd, DETECT_TIMEOUT_SECS).await?;
    Ok(stderr_reports_interlace(&output.stderr_text()))
}
