//! Job-scoped workspace directories.

use std::path::{Path, PathBuf};
use tracing::warn;

use restore_models::{Container, JobId};

use crate::config::AppConfig;

/// Private per-job directory pair: a durable output area and a scratch area
/// for intermediates.
///
/// Owned exclusively by the orchestrator for the job's lifetime. Directories
/// are keyed by the job-unique id, so concurrent invocations never collide
/// on disk. The scratch half is removed after a successful run when cleanup
/// is enabled; early failure exits leave it behind (matching the retention
/// policy of delivery-before-cleanup).
#[derive(Debug)]
pub struct JobWorkspace {
    pub job_id: JobId,
    work_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl JobWorkspace {
    /// Create both directory trees for a new job.
    pub async fn create(app: &AppConfig, job_id: JobId) -> std::io::Result<Self> {
        let work_dir = app.work_dir.join(job_id.as_str());
        let tmp_dir = app.tmp_dir.join(job_id.as_str());
        tokio::fs::create_dir_all(&work_dir).await?;
        tokio::fs::create_dir_all(&tmp_dir).await?;
        Ok(Self {
            job_id,
            work_dir,
            tmp_dir,
        })
    }

    /// Downloaded source bytes.
    pub fn input_path(&self) -> PathBuf {
        self.tmp_dir.join("input")
    }

    /// Output of the combined preprocess filter pass.
    pub fn preprocessed_path(&self) -> PathBuf {
        self.tmp_dir.join("preprocessed.mp4")
    }

    /// Output of the super-resolution pass.
    pub fn upscaled_path(&self) -> PathBuf {
        self.tmp_dir.join("upscaled.mp4")
    }

    /// Extracted audio-only track.
    pub fn audio_path(&self) -> PathBuf {
        self.tmp_dir.join("audio.m4a")
    }

    /// Final deliverable, in the durable area.
    pub fn output_path(&self, container: Container) -> PathBuf {
        self.work_dir.join(format!("final.{}", container))
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.tmp_dir
    }

    /// Best-effort scratch removal; failures are logged and swallowed so a
    /// successful job can never be turned into a failure by cleanup.
    pub async fn cleanup_scratch(&self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.tmp_dir).await {
            warn!("Failed to remove scratch dir {}: {}", self.tmp_dir.display(), e);
        }
    }
}
