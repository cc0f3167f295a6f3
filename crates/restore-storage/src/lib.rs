//! S3-compatible delivery storage for restored outputs.
//!
//! Uploads the final artifact and produces a time-limited presigned GET
//! URL. The pipeline treats storage as optional: when no destination is
//! configured, delivery falls back to a local `file://` reference.

pub mod client;
pub mod error;

pub use client::{StorageClient, StorageConfig};
pub use error::{StorageError, StorageResult};
