//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use launcher_core::{ApiClient, ApiConfig, HttpFetcher, VersionStore};
use wiremock::MockServer;

/// Starts a mock server, or returns `None` when the sandbox forbids binding
/// local sockets.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if let Err(error) = TcpListener::bind("127.0.0.1:0") {
        eprintln!("skipping: cannot bind local socket ({error})");
        return None;
    }
    Some(MockServer::start().await)
}

/// `host:port/` of the mock server, as used for scheme-less asset URLs.
pub fn host_path(server: &MockServer) -> String {
    server
        .uri()
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
        + "/"
}

/// API client pointed at `server` with API version `version`.
pub fn api_client(server: &MockServer, version: &str) -> ApiClient {
    ApiClient::new(
        HttpFetcher::with_defaults().unwrap(),
        ApiConfig {
            base_url: server.uri(),
            port: None,
            channel: "beta".to_string(),
        },
        Arc::new(VersionStore::new(version)),
    )
}

/// A manifest body advertising version `version` and a runtime per platform.
pub fn manifest_json(version: &str) -> serde_json::Value {
    serde_json::json!({
        "current_game_version": version,
        "current_launcher_version": "0.4.0",
        "builds": {"stable": "bymr-stable.swf", "http": "bymr-http.swf", "local": "bymr-local.swf"},
        "flash_runtimes": {
            "windows": "flashplayer.exe",
            "darwin": "flashplayer.dmg",
            "linux": "flashplayer"
        }
    })
}
