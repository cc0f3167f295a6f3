//! Single-invocation restoration job runner.
//!
//! Reads one request document (JSON) from a path argument or stdin, runs
//! the job to a terminal outcome, and prints the outcome document to
//! stdout. The process exit code mirrors the outcome status.

use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use restore_models::{ErrorCode, JobOutcome, RestoreRequest};
use restore_pipeline::{run_restore_job, AppConfig};
use restore_storage::{StorageClient, StorageConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting vhs-restore");

    // The upscaler is probed per job; ffmpeg and ffprobe are hard
    // prerequisites for every stage, so a missing install fails fast here.
    for check in [restore_media::check_ffmpeg, restore_media::check_ffprobe] {
        if let Err(e) = check() {
            error!("{}", e);
            std::process::exit(2);
        }
    }

    let app = AppConfig::from_env();

    let storage = match StorageConfig::from_env() {
        Some(config) => match StorageClient::new(config) {
            Ok(client) => Some(client),
            Err(e) => {
                error!("Storage configuration invalid: {}", e);
                std::process::exit(2);
            }
        },
        None => {
            info!("No storage destination configured; outputs delivered as local paths");
            None
        }
    };

    let outcome = match read_request().await {
        Ok(request) => {
            // Run the job in its own task so an unclassified fault still
            // yields a structured failure payload instead of a bare crash.
            let job = tokio::spawn({
                let app = app.clone();
                let storage = storage.clone();
                async move { run_restore_job(&app, storage.as_ref(), &request).await }
            });
            match job.await {
                Ok(outcome) => outcome,
                Err(e) => JobOutcome::Failed {
                    error_code: ErrorCode::Internal,
                    error_message: format!("Job aborted unexpectedly: {}", e),
                    logs: Vec::new(),
                },
            }
        }
        Err(message) => JobOutcome::Failed {
            error_code: ErrorCode::Validation,
            error_message: message,
            logs: Vec::new(),
        },
    };

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize outcome: {}", e);
            std::process::exit(2);
        }
    }

    if !outcome.is_completed() {
        std::process::exit(1);
    }
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("restore_pipeline=info".parse().expect("valid directive"))
        .add_directive("restore_media=info".parse().expect("valid directive"))
        .add_directive("restore_storage=info".parse().expect("valid directive"))
        .add_directive("vhs_restore=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Read the request document from the first argument (a file path, or `-`
/// for stdin) or, with no argument, from stdin.
async fn read_request() -> Result<RestoreRequest, String> {
    let arg = std::env::args().nth(1);
    let raw = match arg.as_deref() {
        Some("-") | None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(|e| format!("Failed to read request from stdin: {}", e))?;
            buf
        }
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read request file {}: {}", path, e))?,
    };

    serde_json::from_str(&raw).map_err(|e| format!("Invalid request payload: {}", e))
}
