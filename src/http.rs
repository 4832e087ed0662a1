//! Shared HTTP client construction.
//!
//! The API client, the manifest fetcher and the runtime downloader all go
//! through one [`HttpFetcher`] so they share connection pooling, timeouts and
//! the launcher User-Agent.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::user_agent;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes, sized for runtime downloads).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Timeout configuration for the shared client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// Reusable HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a client with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns the underlying builder error when the TLS backend or system
    /// configuration cannot be initialised.
    pub fn new(settings: HttpSettings) -> Result<Self, reqwest::Error> {
        debug!(
            connect_secs = settings.connect_timeout_secs,
            read_secs = settings.read_timeout_secs,
            "building HTTP client"
        );
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_launcher_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Builds a client with default timeouts.
    ///
    /// # Errors
    ///
    /// See [`HttpFetcher::new`].
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(HttpSettings::default())
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
