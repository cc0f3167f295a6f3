//! HTTP source download and header-only size probing.

use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Advisory header-only size probe.
///
/// Returns the advertised Content-Length in bytes, or `None` when the probe
/// fails or the server reports no length. The gate built on this is
/// advisory only; callers must never fail a job because the probe itself
/// failed.
pub async fn head_content_length(url: &str, timeout_secs: u64) -> Option<u64> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .ok()?;

    let response = client.head(url).send().await.ok()?;
    // HEAD responses carry no body, so the advertised length must come from
    // the header itself rather than the body size hint.
    let length = response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok();
    debug!("HEAD {} content-length: {:?}", url, length);
    length
}

/// Stream the source to a local file.
///
/// The whole transfer is bounded by `timeout_secs`; the body is streamed in
/// chunks rather than buffered so multi-gigabyte tapes do not sit in memory.
pub async fn download_to_file(
    url: &str,
    path: impl AsRef<Path>,
    timeout_secs: u64,
) -> MediaResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MediaError::download_failed(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(MediaError::download_failed(format!(
            "HTTP status {}",
            response.status()
        )));
    }

    let mut file = tokio::fs::File::create(path.as_ref()).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| MediaError::download_failed(e.to_string()))?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(())
}
