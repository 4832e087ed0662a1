//! API request client.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::method::Method;
use crate::error::{CONNECT_ERROR_MESSAGE, LauncherError};
use crate::http::HttpFetcher;
use crate::version::VersionStore;

/// Release-stage literal embedded after the version in the API path.
pub const DEFAULT_CHANNEL: &str = "beta";

/// API host used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost";

/// Where the API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Scheme and host, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Explicit port; omitted from the URL when `None`.
    pub port: Option<u16>,
    /// Release channel, e.g. `beta` or `alpha`.
    pub channel: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            port: None,
            channel: DEFAULT_CHANNEL.to_string(),
        }
    }
}

/// A successful API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Decoded response body.
    pub data: T,
    /// Top-level `token` field of the body, if the server sent one.
    pub token: Option<String>,
}

/// Error body shape; older servers use `error`, newer ones `message`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Client for the versioned launcher API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    fetcher: HttpFetcher,
    config: ApiConfig,
    version: Arc<VersionStore>,
}

impl ApiClient {
    /// Creates a client. The version is read from `version` on every request.
    #[must_use]
    pub fn new(fetcher: HttpFetcher, config: ApiConfig, version: Arc<VersionStore>) -> Self {
        Self {
            fetcher,
            config,
            version,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Builds the full URL for `route`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Config`] when no version is known yet or the
    /// resulting URL does not parse.
    pub fn url_for(&self, route: &str) -> Result<String, LauncherError> {
        let version = self.version.get();
        if version.is_empty() {
            return Err(LauncherError::config(
                "API version is unknown; the server manifest has not been loaded yet",
            ));
        }

        let base = self.config.base_url.trim_end_matches('/');
        let host = match self.config.port {
            Some(port) => format!("{base}:{port}"),
            None => base.to_string(),
        };
        let route = route.trim_start_matches('/');
        let url = format!(
            "{host}/api/v{version}-{channel}/{route}",
            channel = self.config.channel
        );

        Url::parse(&url)
            .map_err(|e| LauncherError::config(format!("invalid API URL '{url}': {e}")))?;
        Ok(url)
    }

    /// Sends a request and decodes the JSON response.
    ///
    /// `body` is serialized as JSON for every method except GET.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::Config`] if the URL cannot be built
    /// - [`LauncherError::Network`] if no response arrives
    /// - [`LauncherError::Http`] for non-2xx statuses
    /// - [`LauncherError::Decode`] if a 2xx body does not match `T`
    #[instrument(skip(self, body), fields(method = %method))]
    pub async fn invoke_api_request<T, B>(
        &self,
        route: &str,
        body: &B,
        method: Method,
    ) -> Result<ApiResponse<T>, LauncherError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url_for(route)?;
        debug!(url = %url, "sending API request");

        let mut request = self
            .fetcher
            .inner()
            .request(method.into(), &url)
            .header(CONTENT_TYPE, "application/json");
        if method.carries_body() {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LauncherError::network(&url, e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LauncherError::network(&url, e.to_string()))?;

        if !status.is_success() {
            let message = error_message_from_body(&bytes);
            warn!(status = status.as_u16(), message = %message, "API request rejected");
            return Err(LauncherError::http(status.as_u16(), message));
        }

        let value: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| {
                LauncherError::decode(format!("Unexpected response from '{route}': {e}"))
            })?
        };
        let token = value
            .get("token")
            .and_then(Value::as_str)
            .map(str::to_string);
        let data = serde_json::from_value(value).map_err(|e| {
            LauncherError::decode(format!("Unexpected response from '{route}': {e}"))
        })?;

        debug!(status = status.as_u16(), has_token = token.is_some(), "API request succeeded");
        Ok(ApiResponse {
            status: status.as_u16(),
            data,
            token,
        })
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::invoke_api_request`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        route: &str,
    ) -> Result<ApiResponse<T>, LauncherError> {
        self.invoke_api_request(route, &Value::Null, Method::Get)
            .await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::invoke_api_request`].
    pub async fn post<T, B>(&self, route: &str, body: &B) -> Result<ApiResponse<T>, LauncherError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.invoke_api_request(route, body, Method::Post).await
    }

    /// Lists the game languages the server supports.
    ///
    /// Failures are logged and yield an empty list.
    pub async fn get_available_languages(&self) -> Vec<String> {
        match self.get::<Vec<String>>("/supportedLangs").await {
            Ok(response) => response.data,
            Err(error) => {
                warn!(error = %error, "error getting available languages");
                Vec::new()
            }
        }
    }
}

fn error_message_from_body(bytes: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(bytes)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| CONNECT_ERROR_MESSAGE.to_string())
}
