//! Current game version and the server version manifest.
//!
//! The API path embeds the game version (`/api/v<version>-<channel>/...`),
//! so the request client reads [`VersionStore`] on every call. The version
//! is normally learned from the server manifest at start-up.

mod manifest;

pub use manifest::{
    Builds, FlashRuntimes, ManifestError, VersionManifest, fetch_server_manifest,
};

use tracing::info;

use crate::store::Store;

/// Holds the version string used to build API URLs.
#[derive(Debug, Default)]
pub struct VersionStore {
    current: Store<String>,
}

impl VersionStore {
    /// Creates a store with an initial version (may be empty).
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: Store::new(initial.into()),
        }
    }

    /// Returns the current version, possibly empty.
    #[must_use]
    pub fn get(&self) -> String {
        self.current.get()
    }

    /// Publishes a new version; surrounding whitespace is dropped.
    pub fn set(&self, version: &str) {
        self.current.set(version.trim().to_string());
    }

    /// Whether a non-empty version is known.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.current.with(|v| !v.is_empty())
    }

    /// Clears the version.
    pub fn reset(&self) {
        self.current.set(String::new());
    }

    /// Observes version changes.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<String> {
        self.current.subscribe()
    }

    /// Publishes the game version carried by a server manifest.
    pub fn refresh_from(&self, manifest: &VersionManifest) {
        info!(version = %manifest.current_game_version, "game version updated from manifest");
        self.set(&manifest.current_game_version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_store_starts_empty() {
        let store = VersionStore::default();
        assert!(!store.is_set());
        assert_eq!(store.get(), "");
    }

    #[test]
    fn test_version_store_trims_and_resets() {
        let store = VersionStore::new("");
        store.set(" 0.2.8 ");
        assert_eq!(store.get(), "0.2.8");
        assert!(store.is_set());
        store.reset();
        assert!(!store.is_set());
    }

    #[test]
    fn test_version_store_whitespace_only_is_unset() {
        let store = VersionStore::default();
        store.set("   ");
        assert!(!store.is_set());
    }

    #[test]
    fn test_refresh_from_manifest() {
        let store = VersionStore::default();
        let manifest = VersionManifest {
            current_game_version: "1.4.0".to_string(),
            ..VersionManifest::default()
        };
        store.refresh_from(&manifest);
        assert_eq!(store.get(), "1.4.0");
    }
}
