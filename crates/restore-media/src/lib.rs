//! External tool layer for the vhs-restore pipeline.
//!
//! This crate provides:
//! - A timed runner for external processes (ffmpeg, ffprobe, the upscaler)
//!   with timeout kill and stderr capture
//! - ffprobe metadata parsing
//! - Interlace detection via a bounded `idet` sample pass
//! - Filter-chain construction (deinterlace, exposure, denoise, sharpen)
//! - HTTP source download and header-only size probing

pub mod command;
pub mod download;
pub mod error;
pub mod filters;
pub mod interlace;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, check_upscaler, run_tool, upscaler_banner, ToolCommand, UPSCALER_BIN};
pub use download::{download_to_file, head_content_length};
pub use error::{MediaError, MediaResult};
pub use filters::{
    build_denoise_filter, build_exposure_filter, build_sharpen_filter, join_chain,
    ExposurePolicy, DEINTERLACE_FALLBACK, DEINTERLACE_PRIMARY,
};
pub use interlace::{detect_interlace, stderr_reports_interlace};
pub use probe::{probe_metadata, ProbeMetadata, ProbeStream};
