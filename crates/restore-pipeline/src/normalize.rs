//! Request normalization.
//!
//! Precedence: explicit request field > profile field > system default.
//! An unrecognized profile name is treated as "no profile" here; the
//! validator is what rejects it.

use restore_models::{
    profile_by_name, Codec, Container, DeinterlaceMode, JobConfig, RestoreRequest,
    TargetResolution,
};

use crate::config::AppConfig;

/// Overlay the named profile (if any, and recognized) under the caller's
/// explicit fields. No side effects.
pub fn apply_profile(request: &RestoreRequest) -> RestoreRequest {
    match request
        .profile
        .as_deref()
        .and_then(profile_by_name)
    {
        Some(profile) => request.merged_with(profile),
        None => request.clone(),
    }
}

/// Fill every remaining unset field from system defaults, producing the
/// fully-resolved field mapping the validator checks.
pub fn fill_defaults(request: RestoreRequest, app: &AppConfig) -> RestoreRequest {
    let d = &app.defaults;
    RestoreRequest {
        input_url: request.input_url,
        profile: request.profile,
        deinterlace: request
            .deinterlace
            .or_else(|| Some(d.deinterlace.as_str().to_string())),
        denoise_strength: request
            .denoise_strength
            .or(Some(f64::from(d.denoise_strength))),
        sharpen_strength: request
            .sharpen_strength
            .or(Some(f64::from(d.sharpen_strength))),
        brightness: request.brightness.or(Some(d.brightness)),
        gamma: request.gamma.or(Some(d.gamma)),
        contrast: request.contrast.or(Some(d.contrast)),
        auto_exposure: request.auto_exposure.or(Some(d.auto_exposure)),
        model: request.model.or_else(|| Some(d.model.clone())),
        target_resolution: request
            .target_resolution
            .or_else(|| Some(d.target_resolution.clone())),
        codec: request.codec.or_else(|| Some(d.codec.as_str().to_string())),
        container: request
            .container
            .or_else(|| Some(d.container.as_str().to_string())),
        keep_audio: request.keep_audio.or(Some(d.keep_audio)),
        preset: request.preset.or_else(|| Some(d.preset.clone())),
        // CRF stays open here: its default depends on the resolved codec
        crf: request.crf,
    }
}

/// Turn the validated field mapping into the typed job configuration.
///
/// Runs after validation, so enum and range parses are expected to succeed;
/// any residual mismatch falls back to the system default rather than
/// panicking. The one hard error is an unparsable target resolution, which
/// can reach here through a misconfigured default.
pub fn resolve(request: &RestoreRequest, app: &AppConfig) -> Result<JobConfig, String> {
    let d = &app.defaults;

    let target_str = request
        .target_resolution
        .as_deref()
        .unwrap_or(&d.target_resolution);
    let target = TargetResolution::parse(target_str)
        .ok_or_else(|| "Invalid target resolution".to_string())?;

    let codec = request
        .codec
        .as_deref()
        .and_then(Codec::parse)
        .unwrap_or(d.codec);

    Ok(JobConfig {
        input_url: request.input_url.clone().unwrap_or_default(),
        deinterlace: request
            .deinterlace
            .as_deref()
            .and_then(DeinterlaceMode::parse)
            .unwrap_or(d.deinterlace),
        denoise_strength: request
            .denoise_strength
            .map(|v| v.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(d.denoise_strength),
        sharpen_strength: request
            .sharpen_strength
            .map(|v| v.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(d.sharpen_strength),
        brightness: request.brightness.unwrap_or(d.brightness),
        gamma: request.gamma.unwrap_or(d.gamma),
        contrast: request.contrast.unwrap_or(d.contrast),
        auto_exposure: request.auto_exposure.unwrap_or(d.auto_exposure),
        model: request.model.clone().unwrap_or_else(|| d.model.clone()),
        target,
        codec,
        container: request
            .container
            .as_deref()
            .and_then(Container::parse)
            .unwrap_or(d.container),
        keep_audio: request.keep_audio.unwrap_or(d.keep_audio),
        preset: request.preset.clone().unwrap_or_else(|| d.preset.clone()),
        crf: request.crf.unwrap_or_else(|| app.default_crf_for(codec)),
    })
}
