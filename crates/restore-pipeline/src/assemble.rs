//! Success metadata assembly.
//!
//! Assembly never fails: missing or malformed probe fields degrade to
//! defaults rather than raising this late in a job that already produced
//! its deliverable.

use restore_media::ProbeMetadata;
use restore_models::{AppliedExposure, JobMetadata, TargetResolution};

/// Derive the success metadata from probe data and applied parameters.
pub fn assemble_metadata(
    probe: &ProbeMetadata,
    target: TargetResolution,
    interlace_detected: bool,
    applied_exposure: AppliedExposure,
) -> JobMetadata {
    JobMetadata {
        duration_sec: probe.duration_sec(),
        input_resolution: probe.input_resolution(),
        output_resolution: target.to_string(),
        interlace_detected,
        applied_exposure,
    }
}
