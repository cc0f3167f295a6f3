//! FFprobe source metadata.

use serde::Deserialize;
use std::path::Path;

use crate::command::{check_ffprobe, run_tool, ToolCommand};
use crate::error::{MediaError, MediaResult};

/// Per-invocation ceiling for the probe itself.
const PROBE_TIMEOUT_SECS: u64 = 120;

/// Structural facts about the source container, as reported by ffprobe.
///
/// Read-only; consumed once when assembling the success metadata. Missing or
/// malformed fields degrade to defaults there rather than failing the job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeMetadata {
    #[serde(default)]
    pub format: ProbeFormat,
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeFormat {
    /// Container duration, reported as a decimal string
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeStream {
    pub codec_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ProbeMetadata {
    /// Container duration in seconds, 0.0 if absent or unparsable.
    pub fn duration_sec(&self) -> f64 {
        self.format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    /// First video stream's resolution as "WxH", "" if none was reported.
    pub fn input_resolution(&self) -> String {
        self.streams
            .iter()
            .find(|s| s.codec_type == "video")
            .and_then(|s| match (s.width, s.height) {
                (Some(w), Some(h)) if w > 0 && h > 0 => Some(format!("{}x{}", w, h)),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Probe a downloaded source for container and stream metadata.
pub async fn probe_metadata(path: impl AsRef<Path>) -> MediaResult<ProbeMetadata> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }
    check_ffprobe()?;

    let cmd = ToolCommand::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path.to_string_lossy());

    let output = run_tool(&cmd, PROBE_TIMEOUT_SECS).await?;
    let meta: ProbeMetadata = serde_json::from_slice(&output.stdout)?;
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_ffprobe_json() {
        let json = r#"{
            "format": {"duration": "10.500000"},
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 720, "height": 480}
            ]
        }"#;
        let meta: ProbeMetadata = serde_json::from_str(json).unwrap();
        assert!((meta.duration_sec() - 10.5).abs() < 1e-9);
        assert_eq!(meta.input_resolution(), "720x480");
    }

    #[test]
    fn test_missing_fields_degrade_to_defaults() {
        let meta: ProbeMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(meta.duration_sec(), 0.0);
        assert_eq!(meta.input_resolution(), "");
    }

    #[test]
    fn test_unparsable_duration_degrades_to_zero() {
        let meta: ProbeMetadata =
            serde_json::from_str(r#"{"format": {"duration": "N/A"}}"#).unwrap();
        assert_eq!(meta.duration_sec(), 0.0);
    }

    #[test]
    fn test_video_stream_without_dimensions_yields_empty_resolution() {
        let meta: ProbeMetadata =
            serde_json::from_str(r#"{"streams": [{"codec_type": "video"}]}"#).unwrap();
        assert_eq!(meta.input_resolution(), "");
    }
}
