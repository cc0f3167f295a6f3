//! Shared data models for the vhs-restore pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Raw job requests and fully resolved job configuration
//! - Named parameter profiles
//! - The fixed error-code taxonomy
//! - Success/failure result payloads

pub mod error_code;
pub mod job;
pub mod outcome;
pub mod profile;
pub mod request;

pub use error_code::ErrorCode;
pub use job::{Codec, Container, DeinterlaceMode, JobConfig, JobId, TargetResolution};
pub use outcome::{AppliedExposure, JobMetadata, JobOutcome};
pub use profile::{profile_by_name, profile_names, Profile};
pub use request::RestoreRequest;
