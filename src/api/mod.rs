//! Versioned HTTP API client.
//!
//! Requests go to `<base>[:port]/api/v<version>-<channel>/<route>` with JSON
//! bodies. Every failure comes back as a [`LauncherError`](crate::LauncherError)
//! whose message is ready for display.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use launcher_core::{ApiClient, ApiConfig, HttpFetcher, Method, VersionStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let version = Arc::new(VersionStore::new("0.2.8"));
//! let client = ApiClient::new(HttpFetcher::with_defaults()?, ApiConfig::default(), version);
//! let languages: Vec<String> = client.get_available_languages().await;
//! println!("{languages:?}");
//! # Ok(())
//! # }
//! ```

mod client;
mod method;

pub use client::{ApiClient, ApiConfig, ApiResponse, DEFAULT_BASE_URL, DEFAULT_CHANNEL};
pub use method::Method;
