//! Single-job orchestration engine for VHS restoration.
//!
//! One invocation executes exactly one job: normalize the request against
//! profiles and defaults, validate it, drive the fixed stage sequence
//! (size check, download, probe, interlace detection, preprocess, upscale,
//! audio extraction, encode, delivery), enforce per-stage and job-wide
//! timeouts, and return a structured outcome either way. Concurrency across
//! jobs belongs to the caller; the core holds no cross-job state.

pub mod assemble;
pub mod config;
pub mod error;
pub mod exec;
pub mod joblog;
pub mod normalize;
pub mod pipeline;
pub mod validate;
pub mod workspace;

pub use config::{AppConfig, JobDefaults};
pub use error::{PipelineFailure, PipelineResult};
pub use joblog::JobLog;
pub use pipeline::run_restore_job;
pub use workspace::JobWorkspace;
