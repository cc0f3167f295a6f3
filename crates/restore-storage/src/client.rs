//! S3-compatible storage client.

use std::path::Path;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Default TTL for presigned delivery URLs: 7 days.
const DEFAULT_SIGNED_URL_TTL_SEC: u64 = 604_800;

/// Configuration for the delivery storage destination.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Region ("auto" works for most S3-compatible providers)
    pub region: String,
    /// Bucket name
    pub bucket_name: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Key prefix for uploaded outputs
    pub output_prefix: String,
    /// Presigned URL lifetime
    pub signed_url_ttl: Duration,
}

impl StorageConfig {
    /// Read the destination from `S3_*` environment variables.
    ///
    /// Storage is considered configured only when both the endpoint and the
    /// bucket are set and non-empty; otherwise delivery stays local and this
    /// returns `None`.
    pub fn from_env() -> Option<Self> {
        let endpoint_url = std::env::var("S3_ENDPOINT").unwrap_or_default();
        let bucket_name = std::env::var("S3_BUCKET").unwrap_or_default();
        if endpoint_url.is_empty() || bucket_name.is_empty() {
            return None;
        }

        Some(Self {
            endpoint_url,
            bucket_name,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
            access_key_id: std::env::var("S3_ACCESS_KEY_ID").unwrap_or_default(),
            secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").unwrap_or_default(),
            output_prefix: std::env::var("S3_OUTPUT_PREFIX")
                .unwrap_or_else(|_| "vhs2k/".to_string()),
            signed_url_ttl: Duration::from_secs(
                std::env::var("S3_SIGNED_URL_TTL_SEC")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SIGNED_URL_TTL_SEC),
            ),
        })
    }
}

/// Client for the S3-compatible delivery destination.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    bucket: String,
    output_prefix: String,
    signed_url_ttl: Duration,
}

impl StorageClient {
    /// Create a new client from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
            return Err(StorageError::config_error(
                "S3_ACCESS_KEY_ID / S3_SECRET_ACCESS_KEY not set",
            ));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "vhs-restore",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            output_prefix: config.output_prefix,
            signed_url_ttl: config.signed_url_ttl,
        })
    }

    /// The object key an output file will be delivered under.
    pub fn output_key(&self, filename: &str) -> String {
        format!("{}{}", self.output_prefix, filename)
    }

    /// Upload a file.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to {}", path.display(), key);
        Ok(())
    }

    /// Generate a time-limited presigned GET URL for a delivered object.
    pub async fn presign_get(&self, key: &str) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(self.signed_url_ttl)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StorageConfig {
        StorageConfig {
            endpoint_url: "https://s3.example.com".to_string(),
            region: "auto".to_string(),
            bucket_name: "restored".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            output_prefix: "vhs2k/".to_string(),
            signed_url_ttl: Duration::from_secs(3600),
        }
    }

    #[test]
    fn test_output_key_uses_prefix() {
        let client = StorageClient::new(test_config()).unwrap();
        assert_eq!(client.output_key("final.mp4"), "vhs2k/final.mp4");
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let mut config = test_config();
        config.access_key_id.clear();
        assert!(matches!(
            StorageClient::new(config),
            Err(StorageError::Config(_))
        ));
    }
}
