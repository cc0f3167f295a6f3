//! Request validation.
//!
//! Collects every violation in one pass rather than failing on the first,
//! so the caller sees the complete list of problems at once.

use restore_models::{
    profile_by_name, profile_names, Codec, Container, DeinterlaceMode, ErrorCode, RestoreRequest,
    TargetResolution,
};
use url::Url;

use crate::config::AppConfig;
use crate::error::{PipelineFailure, PipelineResult};
use crate::joblog::JobLog;

/// Validate the resolved field mapping. Pure gate: returns nothing on
/// success, a single `ERR_VALIDATION` failure carrying every collected
/// message otherwise.
pub fn validate(request: &RestoreRequest, app: &AppConfig, log: &mut JobLog) -> PipelineResult<()> {
    let errors = collect_errors(request, app);
    if errors.is_empty() {
        return Ok(());
    }

    for error in &errors {
        log.push(format!("Validation error: {}", error));
    }
    Err(PipelineFailure::raise(
        ErrorCode::Validation,
        format!("Invalid request: {}", errors.join("; ")),
        log,
    ))
}

fn collect_errors(request: &RestoreRequest, app: &AppConfig) -> Vec<String> {
    let mut errors = Vec::new();

    match request.input_url.as_deref() {
        None | Some("") => errors.push("input_url required".to_string()),
        Some(input_url) => match Url::parse(input_url) {
            Ok(url) if url.scheme() == "https" || url.scheme() == "http" => {
                if url.scheme() == "http" && !app.allow_http_input {
                    errors.push("http input not allowed".to_string());
                }
                if !extension_allowed(&url, &app.allowed_extensions) {
                    errors.push("extension not allowed".to_string());
                }
            }
            _ => errors.push("input_url must be http(s)".to_string()),
        },
    }

    range_check(&mut errors, "denoise_strength", request.denoise_strength, 0.0, 100.0);
    range_check(&mut errors, "sharpen_strength", request.sharpen_strength, 0.0, 100.0);
    range_check(&mut errors, "brightness", request.brightness, -1.0, 1.0);
    range_check(&mut errors, "gamma", request.gamma, 0.6, 1.8);
    range_check(&mut errors, "contrast", request.contrast, 0.5, 1.5);

    if let Some(mode) = request.deinterlace.as_deref() {
        if DeinterlaceMode::parse(mode).is_none() {
            errors.push("deinterlace must be auto|on|off".to_string());
        }
    }
    if let Some(codec) = request.codec.as_deref() {
        if Codec::parse(codec).is_none() {
            errors.push("codec must be h264|h265".to_string());
        }
    }
    if let Some(container) = request.container.as_deref() {
        if Container::parse(container).is_none() {
            errors.push("container must be mp4|mkv".to_string());
        }
    }

    if let Some(target) = request.target_resolution.as_deref() {
        if TargetResolution::parse(target).is_none() {
            errors.push("target_resolution must be WIDTHxHEIGHT".to_string());
        }
    }

    if let Some(profile) = request.profile.as_deref() {
        if profile_by_name(profile).is_none() {
            errors.push(format!("profile must be {}", profile_names().join("|")));
        }
    }

    errors
}

/// Check a source URL's file extension against the allow-list. Derived from
/// the path component only (query string excluded); a path without any
/// extension passes, as does an empty allow-list.
fn extension_allowed(url: &Url, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let path = url.path();
    let Some((_, ext)) = path.rsplit_once('.') else {
        return true;
    };
    if ext.is_empty() || ext.contains('/') {
        return true;
    }
    allowed.iter().any(|a| a == &ext.to_lowercase())
}

fn range_check(errors: &mut Vec<String>, name: &str, value: Option<f64>, lo: f64, hi: f64) {
    if let Some(v) = value {
        if !v.is_finite() || v < lo || v > hi {
            errors.push(format!("{} out of range", name));
        }
    }
}
