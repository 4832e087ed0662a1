//! Flash runtime selection and download.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use crate::bridge::{BridgeError, codes};
use crate::http::HttpFetcher;
use crate::version::FlashRuntimes;

/// Picks the runtime file name for `os` (as reported by `std::env::consts::OS`).
///
/// # Errors
///
/// Returns `E_UNSUPPORTED_PLATFORM` for unknown platforms and
/// `E_MANIFEST_UNAVAILABLE` when the manifest lists nothing for this one.
pub fn platform_runtime(runtimes: &FlashRuntimes, os: &str) -> Result<String, BridgeError> {
    let name = match os {
        "windows" => &runtimes.windows,
        "darwin" | "macos" => &runtimes.darwin,
        "linux" => &runtimes.linux,
        _ => {
            return Err(BridgeError::new(
                codes::UNSUPPORTED_PLATFORM,
                format!("unsupported platform: {os}"),
            ));
        }
    };
    if name.trim().is_empty() {
        return Err(BridgeError::new(
            codes::MANIFEST_UNAVAILABLE,
            format!("server manifest lists no flash runtime for {os}"),
        ));
    }
    Ok(name.clone())
}

/// Streams `url` into `path`, returning the number of bytes written.
///
/// The body goes to `<path>.part` first and is renamed into place once
/// complete, so `path` only ever exists with the full download. The partial
/// file is removed on failure.
///
/// # Errors
///
/// Returns `E_DOWNLOAD_FAILED` on network, status or filesystem errors.
#[instrument(skip(fetcher), fields(path = %path.display()))]
pub async fn download_file(
    fetcher: &HttpFetcher,
    url: &str,
    path: &Path,
) -> Result<u64, BridgeError> {
    let response = fetcher
        .inner()
        .get(url)
        .send()
        .await
        .map_err(|e| download_error(format!("Failed to download file: {e}")))?;

    if !response.status().is_success() {
        return Err(download_error(format!(
            "Could not connect & download file - Status: {} {url}",
            response.status()
        )));
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| download_error(format!("Failed to create {}: {e}", parent.display())))?;
    }

    let partial = partial_path(path);
    let file = File::create(&partial)
        .await
        .map_err(|e| download_error(format!("Failed to create file: {e}")))?;

    let result = match stream_to_file(file, response).await {
        Ok(bytes) => tokio::fs::rename(&partial, path)
            .await
            .map(|()| bytes)
            .map_err(|e| download_error(format!("Failed to move download into place: {e}"))),
        Err(error) => Err(error),
    };
    if result.is_err() {
        debug!("cleaning up partial file after error");
        let _ = tokio::fs::remove_file(&partial).await;
    }
    let bytes = result?;
    info!(bytes, "download complete");
    Ok(bytes)
}

/// `<path>.part`, where an in-progress download is written.
#[must_use]
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

async fn stream_to_file(file: File, response: reqwest::Response) -> Result<u64, BridgeError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result
            .map_err(|e| download_error(format!("Failed to read response body: {e}")))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| download_error(format!("Failed to write to file: {e}")))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| download_error(format!("Failed to write to file: {e}")))?;

    Ok(bytes_written)
}

/// Sets the executable bits on a downloaded runtime.
///
/// # Errors
///
/// Returns the underlying I/O error.
#[cfg(unix)]
pub fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    std::fs::set_permissions(path, permissions)
}

/// No-op where executability is not a permission bit.
///
/// # Errors
///
/// Never fails.
#[cfg(not(unix))]
pub fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn download_error(message: String) -> BridgeError {
    BridgeError::new(codes::DOWNLOAD_FAILED, message)
}
