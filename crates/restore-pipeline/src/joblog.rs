//! Append-only, caller-visible job log.

use chrono::Utc;
use tracing::info;

/// Ordered, append-only record of pipeline events for one job.
///
/// Entries are never reordered or truncated and are surfaced verbatim in
/// both the success and failure payloads. Each appended line is mirrored to
/// the tracing subscriber for operator-side visibility.
#[derive(Debug, Default, Clone)]
pub struct JobLog {
    lines: Vec<String>,
}

impl JobLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one timestamped entry.
    pub fn push(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("{}", message);
        self.lines.push(format!(
            "[{}] {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            message
        ));
    }

    /// Snapshot of the log so far, for failure payloads.
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.clone()
    }

    /// Consume the log into its lines, for the terminal payload.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
