//! Job orchestration state machine.
//!
//! Stages run in a fixed order, each gated on the prior one's success:
//! size check, download, probe, interlace detection, preprocess, upscale,
//! audio extraction (optional, degrade-and-continue), encode, delivery.
//! The job-wide wall-clock budget is checked cooperatively at stage
//! boundaries; each external call carries its own hard per-stage timeout.

use std::path::Path;
use std::time::{Duration, Instant};

use restore_media::{
    self as media, ToolCommand, DEINTERLACE_FALLBACK, DEINTERLACE_PRIMARY, UPSCALER_BIN,
};
use restore_models::{
    AppliedExposure, Container, ErrorCode, JobConfig, JobId, JobMetadata, JobOutcome,
    RestoreRequest,
};
use restore_storage::StorageClient;

use crate::assemble::assemble_metadata;
use crate::config::AppConfig;
use crate::error::{PipelineFailure, PipelineResult};
use crate::exec::{classify, run_stage};
use crate::joblog::JobLog;
use crate::normalize;
use crate::validate::validate;
use crate::workspace::JobWorkspace;

/// Fixed short timeout for the advisory HEAD size probe.
const HEAD_PROBE_TIMEOUT_SECS: u64 = 30;

/// Ceiling for the audio extraction pass.
const AUDIO_EXTRACT_TIMEOUT_SECS: u64 = 300;

/// Intermediate encode settings for the preprocess pass: near-lossless and
/// fast, since the upscaler re-encodes anyway.
const PREPROCESS_CRF: &str = "18";
const PREPROCESS_PRESET: &str = "veryfast";

/// Execute one restoration job to a terminal outcome.
///
/// Never panics out and never returns an unclassified fault: the caller
/// always receives either a completed payload or a failure payload carrying
/// a taxonomy code and the full log trail.
pub async fn run_restore_job(
    app: &AppConfig,
    storage: Option<&StorageClient>,
    request: &RestoreRequest,
) -> JobOutcome {
    let mut log = JobLog::new();
    let started = Instant::now();

    match run_inner(app, storage, request, &mut log, started).await {
        Ok((output_url, metadata)) => JobOutcome::Completed {
            output_url,
            metadata,
            logs: log.into_lines(),
        },
        Err(failure) => JobOutcome::Failed {
            error_code: failure.code,
            error_message: failure.message,
            logs: failure.logs,
        },
    }
}

async fn run_inner(
    app: &AppConfig,
    storage: Option<&StorageClient>,
    request: &RestoreRequest,
    log: &mut JobLog,
    started: Instant,
) -> PipelineResult<(String, JobMetadata)> {
    log.push("Job started");
    log_upscaler_info(log).await;

    // Normalize and validate
    let merged = normalize::apply_profile(request);
    let resolved = normalize::fill_defaults(merged, app);
    validate(&resolved, app, log)?;
    let cfg = normalize::resolve(&resolved, app)
        .map_err(|msg| PipelineFailure::raise(ErrorCode::Validation, msg, log))?;

    // Advisory pre-download size gate
    if let Some(length) = media::head_content_length(&cfg.input_url, HEAD_PROBE_TIMEOUT_SECS).await
    {
        log.push(format!("Estimated input size: {:.2} GB", gigabytes(length)));
        if length > app.max_input_bytes() {
            log.push(format!("Input too large: {:.2} GB", gigabytes(length)));
            return Err(PipelineFailure::raise(
                ErrorCode::Validation,
                "Input too large",
                log,
            ));
        }
    } else {
        log.push("HEAD size check failed; continuing without estimate");
    }

    let workspace = JobWorkspace::create(app, JobId::new())
        .await
        .map_err(|e| {
            log.push(format!("Workspace setup failed: {}", e));
            PipelineFailure::raise(ErrorCode::Internal, "Workspace setup failed", log)
        })?;

    // Download
    let input_path = workspace.input_path();
    log.push("Downloading input");
    media::download_to_file(&cfg.input_url, &input_path, app.stage_timeout_download)
        .await
        .map_err(|e| {
            log.push(format!("Download error: {}", e));
            PipelineFailure::raise(ErrorCode::InputDownload, "Input download failed", log)
        })?;

    // Hard post-download size gate on the real byte count
    if let Ok(meta) = tokio::fs::metadata(&input_path).await {
        log.push(format!("Downloaded size: {:.2} GB", gigabytes(meta.len())));
        if meta.len() > app.max_input_bytes() {
            return Err(PipelineFailure::raise(
                ErrorCode::Validation,
                "Input too large",
                log,
            ));
        }
    }
    enforce_budget(started, app, log)?;

    // Probe + interlace detection
    log.push("Running probe");
    let probe = media::probe_metadata(&input_path)
        .await
        .map_err(|e| classify(log, "probe", ErrorCode::InputProbe, "Input probe failed", e))?;

    log.push("Detecting interlace");
    let interlaced = media::detect_interlace(&input_path)
        .await
        .map_err(|e| {
            classify(
                log,
                "interlace_detect",
                ErrorCode::Deinterlace,
                "Processing failed",
                e,
            )
        })?;
    enforce_budget(started, app, log)?;

    // Preprocess: one filter-chain pass (deinterlace + exposure + denoise + sharpen)
    let deinterlacing = wants_deinterlace(&cfg, interlaced);
    let (chain, applied) = build_preprocess_chain(&cfg, deinterlacing, app, log);
    let preprocessed = workspace.preprocessed_path();
    run_preprocess(log, app, &input_path, &preprocessed, &chain).await?;
    enforce_budget(started, app, log)?;

    // Upscale
    let upscaled = workspace.upscaled_path();
    let upscale_cmd = ToolCommand::new(UPSCALER_BIN)
        .arg("-i")
        .arg(preprocessed.to_string_lossy())
        .arg("-o")
        .arg(upscaled.to_string_lossy())
        .arg("-n")
        .arg(&cfg.model)
        .arg("-s")
        .arg(app.defaults.upscale_factor.to_string());
    run_stage(
        log,
        &upscale_cmd,
        "upscale",
        app.stage_timeout_process,
        ErrorCode::Upscale,
    )
    .await?;
    enforce_budget(started, app, log)?;

    // Audio extraction: the one degrade-and-continue stage
    let audio_track = if cfg.keep_audio {
        extract_audio(log, app, &input_path, &workspace).await
    } else {
        None
    };

    // Encode to the target resolution and codec
    let output_path = workspace.output_path(cfg.container);
    let encode_cmd = build_encode_cmd(app, &cfg, &upscaled, audio_track.as_deref(), &output_path);
    run_stage(
        log,
        &encode_cmd,
        "encode",
        app.stage_timeout_process,
        ErrorCode::Encode,
    )
    .await?;
    enforce_budget(started, app, log)?;

    // Delivery
    let output_url = deliver(log, app, storage, &output_path, cfg.container).await?;

    log.push(format!("Job finished in {}s", started.elapsed().as_secs()));

    if app.cleanup_temp && !app.keep_intermediates {
        workspace.cleanup_scratch().await;
    }

    let metadata = assemble_metadata(&probe, cfg.target, interlaced, applied);
    Ok((output_url, metadata))
}

/// Record which upscaler build (if any) is on the PATH, so failed jobs
/// carry the evidence in their log trail.
async fn log_upscaler_info(log: &mut JobLog) {
    match media::check_upscaler() {
        Ok(path) => log.push(format!("which {}: {}", UPSCALER_BIN, path.display())),
        Err(_) => {
            log.push(format!("which {}: NOT FOUND", UPSCALER_BIN));
            return;
        }
    }
    if let Some(banner) = media::upscaler_banner().await {
        log.push(format!("{} -h: {}", UPSCALER_BIN, banner));
    }
}

/// Cooperative job-wide budget check, applied at stage boundaries. A stage
/// already in flight is bounded only by its own per-stage timeout.
fn enforce_budget(started: Instant, app: &AppConfig, log: &mut JobLog) -> PipelineResult<()> {
    if started.elapsed().as_secs() > app.max_job_seconds {
        log.push("Max job time exceeded");
        return Err(PipelineFailure::raise(
            ErrorCode::Timeout,
            "Job timeout",
            log,
        ));
    }
    Ok(())
}

fn gigabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0 * 1024.0)
}

/// Detection feeds the deinterlace decision only in auto mode.
fn wants_deinterlace(cfg: &JobConfig, detected: bool) -> bool {
    match cfg.deinterlace {
        restore_models::DeinterlaceMode::On => true,
        restore_models::DeinterlaceMode::Off => false,
        restore_models::DeinterlaceMode::Auto => detected,
    }
}

/// Build the preprocess filter chain, in order: optional deinterlace,
/// exposure, denoise, optional sharpen. Returns the chain together with the
/// applied exposure triple that the final metadata reports.
fn build_preprocess_chain(
    cfg: &JobConfig,
    deinterlacing: bool,
    app: &AppConfig,
    log: &mut JobLog,
) -> (String, AppliedExposure) {
    let mut filters = Vec::new();
    if deinterlacing {
        filters.push(DEINTERLACE_PRIMARY.to_string());
    }

    let (exposure, b, g, c) = media::build_exposure_filter(
        cfg.brightness,
        cfg.gamma,
        cfg.contrast,
        cfg.auto_exposure,
        &app.exposure_policy,
    );
    if cfg.auto_exposure {
        log.push(format!(
            "Auto exposure applied: b={:.3} g={:.3} c={:.3}",
            b, g, c
        ));
    }
    filters.push(exposure);

    filters.push(media::build_denoise_filter(cfg.denoise_strength));
    if let Some(sharpen) = media::build_sharpen_filter(cfg.sharpen_strength) {
        filters.push(sharpen);
    }

    (
        media::join_chain(&filters),
        AppliedExposure {
            brightness: b,
            gamma: g,
            contrast: c,
            auto_exposure: cfg.auto_exposure,
        },
    )
}

fn preprocess_cmd(input: &Path, output: &Path, chain: &str) -> ToolCommand {
    ToolCommand::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input.to_string_lossy())
        .arg("-vf")
        .arg(chain)
        .args(["-c:v", "libx264", "-crf", PREPROCESS_CRF, "-preset", PREPROCESS_PRESET])
        .arg("-an")
        .arg(output.to_string_lossy())
}

/// Run the preprocess pass with the one defined fallback rule: when the
/// chain carried the primary deinterlace filter, substitute the fallback
/// and retry exactly once under the deinterlace failure code. Any other
/// failure, or a failed retry, propagates.
async fn run_preprocess(
    log: &mut JobLog,
    app: &AppConfig,
    input: &Path,
    output: &Path,
    chain: &str,
) -> PipelineResult<()> {
    let cmd = preprocess_cmd(input, output, chain);
    match run_stage(
        log,
        &cmd,
        "preprocess",
        app.stage_timeout_process,
        ErrorCode::Exposure,
    )
    .await
    {
        Ok(_) => Ok(()),
        Err(_) if chain.contains(DEINTERLACE_PRIMARY) => {
            log.push(format!(
                "{} failed; retrying with {}",
                DEINTERLACE_PRIMARY, DEINTERLACE_FALLBACK
            ));
            let retry_chain = chain.replace(DEINTERLACE_PRIMARY, DEINTERLACE_FALLBACK);
            let retry_cmd = preprocess_cmd(input, output, &retry_chain);
            run_stage(
                log,
                &retry_cmd,
                "preprocess_fallback",
                app.stage_timeout_process,
                ErrorCode::Deinterlace,
            )
            .await?;
            Ok(())
        }
        Err(failure) => Err(failure),
    }
}

/// Attempt audio extraction; failure is logged and the job continues
/// without an audio track. This is the sole non-fatal stage.
async fn extract_audio(
    log: &mut JobLog,
    app: &AppConfig,
    input: &Path,
    workspace: &JobWorkspace,
) -> Option<std::path::PathBuf> {
    let audio_path = workspace.audio_path();
    let cmd = ToolCommand::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input.to_string_lossy())
        .args(["-vn", "-c:a"])
        .arg(&app.defaults.audio_codec)
        .arg("-b:a")
        .arg(&app.defaults.audio_bitrate)
        .arg(audio_path.to_string_lossy());

    match run_stage(
        log,
        &cmd,
        "extract_audio",
        AUDIO_EXTRACT_TIMEOUT_SECS,
        ErrorCode::Encode,
    )
    .await
    {
        Ok(_) => Some(audio_path),
        Err(_) => {
            log.push("Audio extraction failed; continuing without audio");
            None
        }
    }
}

fn build_encode_cmd(
    app: &AppConfig,
    cfg: &JobConfig,
    upscaled: &Path,
    audio: Option<&Path>,
    output: &Path,
) -> ToolCommand {
    let mut cmd = ToolCommand::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(upscaled.to_string_lossy());

    if let Some(audio_path) = audio {
        cmd = cmd.arg("-i").arg(audio_path.to_string_lossy());
    }

    cmd = cmd
        .arg("-vf")
        .arg(format!("scale={}:{}", cfg.target.width, cfg.target.height))
        .arg("-c:v")
        .arg(cfg.codec.encoder())
        .arg("-crf")
        .arg(cfg.crf.to_string())
        .arg("-preset")
        .arg(&cfg.preset);

    if audio.is_some() {
        cmd = cmd
            .args(["-map", "0:v:0", "-map", "1:a:0", "-c:a"])
            .arg(&app.defaults.audio_codec)
            .arg("-b:a")
            .arg(&app.defaults.audio_bitrate);
    }

    cmd.arg(output.to_string_lossy())
}

/// Deliver the encoded artifact: upload and presign when a storage
/// destination is configured, a direct local-path reference otherwise.
async fn deliver(
    log: &mut JobLog,
    app: &AppConfig,
    storage: Option<&StorageClient>,
    output_path: &Path,
    container: Container,
) -> PipelineResult<String> {
    let Some(client) = storage else {
        return Ok(format!("file://{}", output_path.display()));
    };

    let filename = output_path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("final.{}", container));
    let key = client.output_key(&filename);
    let content_type = match container {
        Container::Mp4 => "video/mp4",
        Container::Mkv => "video/x-matroska",
    };

    log.push("Uploading output to storage");
    let upload = client.upload_file(output_path, &key, content_type);
    match tokio::time::timeout(Duration::from_secs(app.stage_timeout_upload), upload).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            log.push(format!("Upload error: {}", e));
            return Err(PipelineFailure::raise(
                ErrorCode::Upload,
                "Upload failed",
                log,
            ));
        }
        Err(_) => {
            log.push("Timeout in upload");
            return Err(PipelineFailure::raise(
                ErrorCode::Upload,
                "Stage timeout",
                log,
            ));
        }
    }

    client.presign_get(&key).await.map_err(|e| {
        log.push(format!("Presign error: {}", e));
        PipelineFailure::raise(ErrorCode::Upload, "Upload failed", log)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use restore_models::DeinterlaceMode;

    fn test_cfg() -> JobConfig {
        let app = AppConfig::default();
        let resolved = normalize::fill_defaults(
            RestoreRequest {
                input_url: Some("https://x/a.mp4".to_string()),
                ..Default::default()
            },
            &app,
        );
        normalize::resolve(&resolved, &app).unwrap()
    }

    #[test]
    fn test_wants_deinterlace_modes() {
        let mut cfg = test_cfg();

        cfg.deinterlace = DeinterlaceMode::On;
        assert!(wants_deinterlace(&cfg, false));

        cfg.deinterlace = DeinterlaceMode::Off;
        assert!(!wants_deinterlace(&cfg, true));

        cfg.deinterlace = DeinterlaceMode::Auto;
        assert!(wants_deinterlace(&cfg, true));
        assert!(!wants_deinterlace(&cfg, false));
    }

    #[test]
    fn test_chain_order_with_deinterlace() {
        let app = AppConfig::default();
        let mut log = JobLog::new();
        let cfg = test_cfg();

        let (chain, _) = build_preprocess_chain(&cfg, true, &app, &mut log);
        let parts: Vec<&str> = chain.split(',').collect();
        assert_eq!(parts[0], "bwdif");
        assert!(parts[1].starts_with("eq="));
        assert!(parts[2].starts_with("hqdn3d="));
        assert!(parts[3].starts_with("unsharp="));
    }

    #[test]
    fn test_chain_without_deinterlace_or_sharpen() {
        let app = AppConfig::default();
        let mut log = JobLog::new();
        let mut cfg = test_cfg();
        cfg.sharpen_strength = 0;

        let (chain, _) = build_preprocess_chain(&cfg, false, &app, &mut log);
        assert!(!chain.contains("bwdif"));
        assert!(!chain.contains("unsharp"));
        assert!(chain.starts_with("eq="));
    }

    #[test]
    fn test_applied_exposure_reports_nudged_values() {
        let app = AppConfig::default();
        let mut log = JobLog::new();
        let mut cfg = test_cfg();
        cfg.auto_exposure = true;

        let (_, applied) = build_preprocess_chain(&cfg, false, &app, &mut log);
        assert!(applied.auto_exposure);
        assert!((applied.brightness - 0.0875).abs() < 1e-9);
        assert!((applied.gamma - 1.105).abs() < 1e-9);
        // The nudge is recorded in the job log
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_budget_enforced_at_boundary() {
        let app = AppConfig {
            max_job_seconds: 0,
            ..Default::default()
        };
        let mut log = JobLog::new();
        let started = Instant::now() - Duration::from_secs(1);

        let failure = enforce_budget(started, &app, &mut log).unwrap_err();
        assert_eq!(failure.code, ErrorCode::Timeout);
        assert_eq!(failure.message, "Job timeout");
    }

    #[test]
    fn test_budget_ok_within_limit() {
        let app = AppConfig::default();
        let mut log = JobLog::new();
        assert!(enforce_budget(Instant::now(), &app, &mut log).is_ok());
    }

    #[test]
    fn test_encode_cmd_includes_audio_maps_only_with_track() {
        let app = AppConfig::default();
        let cfg = test_cfg();
        let upscaled = Path::new("/tmp/u.mp4");
        let output = Path::new("/tmp/final.mp4");

        let without = build_encode_cmd(&app, &cfg, upscaled, None, output);
        assert!(!without.display().contains("-map"));
        assert!(without.display().contains("scale=2048:1080"));
        assert!(without.display().contains("libx265"));

        let audio = Path::new("/tmp/audio.m4a");
        let with = build_encode_cmd(&app, &cfg, upscaled, Some(audio), output);
        assert!(with.display().contains("-map 0:v:0 -map 1:a:0"));
        assert!(with.display().contains("-c:a aac"));
    }

    #[tokio::test]
    async fn test_validation_failure_yields_failed_outcome() {
        let app = AppConfig::default();
        let request = RestoreRequest {
            input_url: Some("https://x/a.mp4".to_string()),
            gamma: Some(9.0),
            brightness: Some(2.0),
            ..Default::default()
        };

        let outcome = run_restore_job(&app, None, &request).await;
        match outcome {
            JobOutcome::Failed {
                error_code,
                error_message,
                logs,
            } => {
                assert_eq!(error_code, ErrorCode::Validation);
                assert!(error_message.contains("gamma out of range"));
                assert!(error_message.contains("brightness out of range"));
                assert!(logs.iter().any(|l| l.ends_with("Job started")));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
