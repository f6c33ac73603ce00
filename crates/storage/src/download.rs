//! Streaming retrieval of a single object to disk.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use hls_common::{HlsError, HlsResult};
use reqwest::Client;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use crate::http::{redact, status_error, transport_error};

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

/// Download `url` into `dest`, returning the number of bytes written.
///
/// Data goes to `<dest>.partial` first and is renamed into place once the
/// body has been read completely, so `dest` never holds a truncated file.
#[instrument(skip(client, url, dest), fields(url = %redact(url), dest = %dest.display()))]
pub async fn download_object(client: &Client, url: &str, dest: &Path) -> HlsResult<u64> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(e, "Download request failed"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status, "Download rejected"));
    }

    let temp_path = partial_path(dest);
    let mut file = File::create(&temp_path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                drop(file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(HlsError::Unavailable(format!(
                    "Download interrupted after {} bytes: {}",
                    written, e
                )));
            }
        };
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    drop(file);
    fs::rename(&temp_path, dest).await?;

    debug!(path = %temp_path.display(), "Renamed partial download");
    info!(bytes = written, "Downloaded object");
    Ok(written)
}
