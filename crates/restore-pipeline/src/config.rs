//! Process-wide configuration.
//!
//! Built once at startup from the environment and passed by reference into
//! the normalizer, validator, and orchestrator. Stage logic never reads the
//! environment directly.

use std::path::PathBuf;

use restore_media::ExposurePolicy;
use restore_models::{Codec, Container, DeinterlaceMode};

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_u8(key: &str, default: u8) -> u8 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        Err(_) => default,
    }
}

/// System defaults for every resolvable job field.
#[derive(Debug, Clone)]
pub struct JobDefaults {
    pub target_resolution: String,
    pub codec: Codec,
    pub container: Container,
    pub crf_h265: u8,
    pub crf_h264: u8,
    pub preset: String,
    pub keep_audio: bool,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub deinterlace: DeinterlaceMode,
    pub denoise_strength: u8,
    pub sharpen_strength: u8,
    pub model: String,
    pub upscale_factor: u32,
    pub brightness: f64,
    pub gamma: f64,
    pub contrast: f64,
    pub auto_exposure: bool,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            target_resolution: "2048x1080".to_string(),
            codec: Codec::H265,
            container: Container::Mp4,
            crf_h265: 20,
            crf_h264: 18,
            preset: "medium".to_string(),
            keep_audio: true,
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            deinterlace: DeinterlaceMode::Auto,
            denoise_strength: 35,
            sharpen_strength: 20,
            model: "realesrgan-x2plus".to_string(),
            upscale_factor: 2,
            brightness: 0.0,
            gamma: 1.0,
            contrast: 1.0,
            auto_exposure: false,
        }
    }
}

/// Process-wide application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Durable output root; deliverables live here until upload completes
    pub work_dir: PathBuf,
    /// Scratch root for intermediate artifacts
    pub tmp_dir: PathBuf,

    /// Job-wide wall-clock budget in seconds
    pub max_job_seconds: u64,
    /// Per-stage ceiling for the source download
    pub stage_timeout_download: u64,
    /// Per-stage ceiling for external processing invocations
    pub stage_timeout_process: u64,
    /// Per-stage ceiling for the delivery upload
    pub stage_timeout_upload: u64,

    /// Delete the scratch workspace after a successful run
    pub cleanup_temp: bool,
    /// Retain intermediates even when cleanup is enabled
    pub keep_intermediates: bool,

    /// Input size ceiling in gigabytes
    pub max_input_gb: u64,
    /// Accept plain-http sources
    pub allow_http_input: bool,
    /// Allowed source file extensions (empty disables the check)
    pub allowed_extensions: Vec<String>,

    pub defaults: JobDefaults,
    pub exposure_policy: ExposurePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/workspace/jobs"),
            tmp_dir: PathBuf::from("/workspace/tmp"),
            max_job_seconds: 28_800,
            stage_timeout_download: 1_800,
            stage_timeout_process: 25_200,
            stage_timeout_upload: 1_800,
            cleanup_temp: true,
            keep_intermediates: false,
            max_input_gb: 20,
            allow_http_input: false,
            allowed_extensions: ["mp4", "mov", "mkv", "avi", "mpeg", "mpg", "m4v"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            defaults: JobDefaults::default(),
            exposure_policy: ExposurePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let base = Self::default();
        let base_defaults = JobDefaults::default();

        let defaults = JobDefaults {
            target_resolution: env_str("DEFAULT_TARGET_RES", &base_defaults.target_resolution),
            codec: Codec::parse(&env_str("DEFAULT_CODEC", base_defaults.codec.as_str()))
                .unwrap_or(base_defaults.codec),
            container: Container::parse(&env_str(
                "DEFAULT_CONTAINER",
                base_defaults.container.as_str(),
            ))
            .unwrap_or(base_defaults.container),
            crf_h265: env_u8("DEFAULT_CRF_H265", base_defaults.crf_h265),
            crf_h264: env_u8("DEFAULT_CRF_H264", base_defaults.crf_h264),
            preset: env_str("DEFAULT_PRESET", &base_defaults.preset),
            keep_audio: env_bool("KEEP_AUDIO", base_defaults.keep_audio),
            audio_codec: env_str("AUDIO_CODEC", &base_defaults.audio_codec),
            audio_bitrate: env_str("AUDIO_BITRATE", &base_defaults.audio_bitrate),
            deinterlace: DeinterlaceMode::parse(&env_str(
                "DEFAULT_DEINTERLACE",
                base_defaults.deinterlace.as_str(),
            ))
            .unwrap_or(base_defaults.deinterlace),
            denoise_strength: env_u8("DEFAULT_DENOISE", base_defaults.denoise_strength),
            sharpen_strength: env_u8("DEFAULT_SHARPEN", base_defaults.sharpen_strength),
            model: env_str("DEFAULT_MODEL", &base_defaults.model),
            upscale_factor: env_u64("UPSCALE_FACTOR", u64::from(base_defaults.upscale_factor))
                as u32,
            brightness: env_f64("DEFAULT_BRIGHTNESS", base_defaults.brightness),
            gamma: env_f64("DEFAULT_GAMMA", base_defaults.gamma),
            contrast: env_f64("DEFAULT_CONTRAST", base_defaults.contrast),
            auto_exposure: env_bool("DEFAULT_AUTO_EXPOSURE", base_defaults.auto_exposure),
        };

        Self {
            work_dir: PathBuf::from(env_str("WORK_DIR", "/workspace/jobs")),
            tmp_dir: PathBuf::from(env_str("TMP_DIR", "/workspace/tmp")),
            max_job_seconds: env_u64("MAX_JOB_SECONDS", base.max_job_seconds),
            stage_timeout_download: env_u64("STAGE_TIMEOUT_DOWNLOAD", base.stage_timeout_download),
            stage_timeout_process: env_u64("STAGE_TIMEOUT_PROCESS", base.stage_timeout_process),
            stage_timeout_upload: env_u64("STAGE_TIMEOUT_UPLOAD", base.stage_timeout_upload),
            cleanup_temp: env_bool("CLEANUP_TEMP", base.cleanup_temp),
            keep_intermediates: env_bool("KEEP_INTERMEDIATES", base.keep_intermediates),
            max_input_gb: env_u64("MAX_INPUT_GB", base.max_input_gb),
            allow_http_input: env_bool("ALLOW_HTTP_INPUT", base.allow_http_input),
            allowed_extensions: env_str(
                "ALLOWED_EXTENSIONS",
                "mp4,mov,mkv,avi,mpeg,mpg,m4v",
            )
            .split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect(),
            defaults,
            exposure_policy: ExposurePolicy {
                strength: env_f64("AUTO_EXPOSURE_STRENGTH", 0.35),
                shadow_lift_limit: env_f64("SHADOW_LIFT_LIMIT", 0.25),
                highlight_protect: env_f64("HIGHLIGHT_PROTECT", 0.85),
            },
        }
    }

    /// Input size ceiling in bytes.
    pub fn max_input_bytes(&self) -> u64 {
        self.max_input_gb * 1024 * 1024 * 1024
    }

    /// Default CRF for a resolved codec.
    pub fn default_crf_for(&self, codec: Codec) -> u8 {
        match codec {
            Codec::H265 => self.defaults.crf_h265,
            Codec::H264 => self.defaults.crf_h264,
        }
    }
}
