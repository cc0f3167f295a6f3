//! Timed runner for external processes.
//!
//! Every external tool the pipeline touches (ffmpeg, ffprobe, the
//! super-resolution binary) goes through [`run_tool`], which enforces a hard
//! per-invocation timeout, kills the child on expiry, and captures both
//! output streams. Callers never spawn processes directly.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Name of the super-resolution binary.
pub const UPSCALER_BIN: &str = "realesrgan-ncnn-vulkan";

/// An external tool invocation: program name plus argument vector.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The full argument vector, for logging.
    pub fn display(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// Captured output of a successful tool run.
#[derive(Debug)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Lossy-decoded stderr for diagnostic parsing; never fails.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Run an external tool to completion or timeout.
///
/// On timeout the child is killed and `MediaError::Timeout` is returned; on
/// a non-zero exit, `MediaError::ToolFailed` carries the lossy-decoded
/// stderr and exit code. On success the captured output is returned for
/// callers that parse it (ffprobe JSON, idet diagnostics).
pub async fn run_tool(cmd: &ToolCommand, timeout_secs: u64) -> MediaResult<ToolOutput> {
    debug!("Running: {}", cmd.display());

    let mut child = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdout_pipe = child.stdout.take().expect("stdout not captured");
    let mut stderr_pipe = child.stderr.take().expect("stderr not captured");

    // Drain both pipes concurrently so a chatty tool cannot deadlock on a
    // full pipe buffer while we wait on its exit status.
    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf).await;
        buf
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf).await;
        buf
    });

    let status = match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await
    {
        Ok(result) => result?,
        Err(_) => {
            warn!(
                "{} timed out after {} seconds, killing process",
                cmd.program, timeout_secs
            );
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            return Err(MediaError::Timeout(timeout_secs));
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    if status.success() {
        Ok(ToolOutput { stdout, stderr })
    } else {
        Err(MediaError::tool_failed(&cmd.program, &stderr, status.code()))
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

/// Check if the super-resolution binary is available.
pub fn check_upscaler() -> MediaResult<PathBuf> {
    which::which(UPSCALER_BIN).map_err(|_| MediaError::UpscalerNotFound)
}

/// Capture the upscaler's `-h` banner, trimmed to 400 characters.
///
/// Logged at job start so failed jobs carry evidence of which upscaler
/// build (if any) was on the PATH. The upscaler exits non-zero for `-h`,
/// so a failed status still yields its diagnostics.
pub async fn upscaler_banner() -> Option<String> {
    check_upscaler().ok()?;

    let cmd = ToolCommand::new(UPSCALER_BIN).arg("-h");
    let text = match run_tool(&cmd, 5).await {
        Ok(output) => {
            let mut combined = output.stderr_text();
            combined.push_str(&String::from_utf8_lossy(&output.stdout));
            combined
        }
        Err(MediaError::ToolFailed { stderr, .. }) => stderr,
        Err(_) => return None,
    };

    let text = text.trim();
    if text.len() > 400 {
        let mut end = 400;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Some(format!("{}...", &text[..end]))
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = ToolCommand::new("ffmpeg")
            .args(["-y", "-i", "input.mp4"])
            .arg("-an")
            .arg("output.mp4");

        assert_eq!(cmd.program(), "ffmpeg");
        assert_eq!(cmd.display(), "ffmpeg -y -i input.mp4 -an output.mp4");
    }

    #[tokio::test]
    async fn test_nonzero_exit_classified_as_tool_failure() {
        let cmd = ToolCommand::new("false");
        match run_tool(&cmd, 10).await {
            Err(MediaError::ToolFailed { tool, .. }) => assert_eq!(tool, "false"),
            other => panic!("expected ToolFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_timeout_classified_as_timeout() {
        let cmd = ToolCommand::new("sleep").arg("5");
        match run_tool(&cmd, 1).await {
            Err(MediaError::Timeout(1)) => {}
            other => panic!("expected Timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_success_captures_stdout() {
        let cmd = ToolCommand::new("echo").arg("hello");
        let output = run_tool(&cmd, 10).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }
}
