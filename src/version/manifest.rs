//! Server version manifest fetch with HTTPS-to-HTTP fallback.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::http::HttpFetcher;

/// Errors while retrieving the server manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Neither scheme produced a response.
    #[error(
        "The server could not be reached. Please check your internet connection & the uptime channel on discord.\n {detail}"
    )]
    Unreachable {
        /// Transport error description from the last attempt.
        detail: String,
    },

    /// The server answered with a non-success status.
    #[error("Could not get server manifest. Failed with status code: {status}")]
    InvalidStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The body is not a valid manifest.
    #[error(
        "The server manifest could not be decoded, there may be an issue with the server or you may need to update your launcher\n Decode Error: {source}"
    )]
    Decode {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Game build download paths keyed by build name.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Builds {
    pub stable: String,
    pub http: String,
    pub local: String,
}

/// Flash runtime file names keyed by platform.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashRuntimes {
    pub windows: String,
    pub darwin: String,
    pub linux: String,
}

/// Versions and downloadable assets advertised by the server.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionManifest {
    pub current_game_version: String,
    pub current_launcher_version: String,
    #[serde(default)]
    pub builds: Builds,
    #[serde(default)]
    pub flash_runtimes: FlashRuntimes,
    /// Set locally: whether the manifest was reached over HTTPS.
    #[serde(default)]
    pub https_worked: bool,
}

/// Fetches the manifest at `host_path` (no scheme), trying HTTPS then HTTP.
///
/// # Errors
///
/// Returns [`ManifestError`] when both schemes fail, when the final attempt
/// yields a non-success status, or when the body does not decode.
#[instrument(skip(fetcher))]
pub async fn fetch_server_manifest(
    fetcher: &HttpFetcher,
    host_path: &str,
) -> Result<VersionManifest, ManifestError> {
    let (body, https_worked) = fetch_text_with_scheme_fallback(fetcher, host_path).await?;
    debug!(bytes = body.len(), "decoding manifest");
    let mut manifest: VersionManifest =
        serde_json::from_str(&body).map_err(|source| ManifestError::Decode { source })?;
    manifest.https_worked = https_worked;
    info!(
        version = %manifest.current_game_version,
        https = https_worked,
        "server manifest retrieved"
    );
    Ok(manifest)
}

async fn fetch_text_with_scheme_fallback(
    fetcher: &HttpFetcher,
    host_path: &str,
) -> Result<(String, bool), ManifestError> {
    match fetch_text(fetcher, "https", host_path).await {
        Ok(body) => Ok((body, true)),
        Err(error) => {
            warn!(error = %error, "manifest over https failed, retrying over http");
            let body = fetch_text(fetcher, "http", host_path).await?;
            Ok((body, false))
        }
    }
}

async fn fetch_text(
    fetcher: &HttpFetcher,
    scheme: &str,
    host_path: &str,
) -> Result<String, ManifestError> {
    let url = format!("{scheme}://{host_path}");
    let response = fetcher
        .inner()
        .get(&url)
        .send()
        .await
        .map_err(|e| ManifestError::Unreachable {
            detail: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ManifestError::InvalidStatus {
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| ManifestError::Unreachable {
            detail: e.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_decodes_without_https_flag() {
        let raw = r#"{
            "current_game_version": "0.2.8",
            "current_launcher_version": "0.4.0",
            "builds": {"stable": "s.swf", "http": "h.swf", "local": "l.swf"},
            "flash_runtimes": {"windows": "fp.exe", "darwin": "fp.dmg", "linux": "fp"}
        }"#;
        let manifest: VersionManifest = serde_json::from_str(raw).unwrap();
        assert_eq!(manifest.current_game_version, "0.2.8");
        assert_eq!(manifest.flash_runtimes.linux, "fp");
        assert!(!manifest.https_worked);
    }

    #[test]
    fn test_manifest_error_messages() {
        let status = ManifestError::InvalidStatus { status: 503 };
        assert!(status.to_string().contains("503"));
        let unreachable = ManifestError::Unreachable {
            detail: "dns".to_string(),
        };
        assert!(unreachable.to_string().contains("could not be reached"));
    }
}
