//! Launch state, last-launch cache and quick launch.
//!
//! [`LaunchStore::launch`] asks the native bridge to start a game build and
//! publishes two pieces of UI state: whether a launch is in flight, and the
//! error (if any) from the last attempt. The options of every launch are
//! cached under `lastLaunch`; [`LaunchStore::quick_launch`] replays the
//! cached build name.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::bridge::{LAUNCH_GAME_COMMAND, NativeBridge};
use crate::debug_log::DebugLogStore;
use crate::error::LauncherError;
use crate::session::{Storage, StorageError};
use crate::store::Store;

/// Storage key holding the last launch options.
pub const LAST_LAUNCH_KEY: &str = "lastLaunch";

/// Language used when the caller does not pick one.
pub const DEFAULT_LANGUAGE: &str = "english";

/// Code published when the bridge error carries none.
pub const UNKNOWN_LAUNCH_ERROR: &str = "An unknown error occurred during the launch process.";

const NO_QUICK_LAUNCH_MESSAGE: &str = "Could not quick launch, no previous launch in storage";

/// Arguments of the `launch_game` bridge command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    pub build_name: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Error state shown by the launch UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchError {
    pub code: String,
    pub show: bool,
}

pub struct LaunchStore {
    bridge: Arc<dyn NativeBridge>,
    storage: Arc<dyn Storage>,
    logs: Arc<DebugLogStore>,
    is_launching: Store<bool>,
    launch_error: Store<LaunchError>,
}

/// Clears the in-flight flag however the launch exits.
struct LaunchingGuard<'a>(&'a Store<bool>);

impl Drop for LaunchingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl LaunchStore {
    #[must_use]
    pub fn new(
        bridge: Arc<dyn NativeBridge>,
        storage: Arc<dyn Storage>,
        logs: Arc<DebugLogStore>,
    ) -> Self {
        Self {
            bridge,
            storage,
            logs,
            is_launching: Store::new(false),
            launch_error: Store::default(),
        }
    }

    /// Launches `build_name`.
    ///
    /// Concurrent calls are not serialized; each one toggles the shared
    /// in-flight flag independently.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Native`] when the bridge rejects the launch.
    /// The same code is published to [`launch_error`](Self::launch_error).
    #[instrument(skip(self, token), fields(has_token = token.is_some()))]
    pub async fn launch(
        &self,
        build_name: &str,
        language: Option<&str>,
        token: Option<&str>,
    ) -> Result<(), LauncherError> {
        let options = LaunchOptions {
            build_name: build_name.to_string(),
            language: language.unwrap_or(DEFAULT_LANGUAGE).to_string(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        };
        self.remember(&options);

        self.is_launching.set(true);
        let _guard = LaunchingGuard(&self.is_launching);

        let args = serde_json::to_value(&options)
            .map_err(|e| LauncherError::unknown(format!("cannot encode launch options: {e}")))?;

        match self.bridge.invoke(LAUNCH_GAME_COMMAND, args).await {
            Ok(_) => {
                info!(build = %options.build_name, "game launched");
                self.launch_error.set(LaunchError::default());
                Ok(())
            }
            Err(error) => {
                let code = if error.code.trim().is_empty() {
                    UNKNOWN_LAUNCH_ERROR.to_string()
                } else {
                    error.code.clone()
                };
                self.logs.add_error_log(format!(
                    "Launch of build '{}' failed: {}",
                    options.build_name, error.message
                ));
                self.launch_error.set(LaunchError {
                    code: code.clone(),
                    show: true,
                });
                Err(LauncherError::native(code, error.message))
            }
        }
    }

    /// Whether a previous launch is cached.
    #[must_use]
    pub fn is_quick_launch_enabled(&self) -> bool {
        matches!(self.storage.get_item(LAST_LAUNCH_KEY), Ok(Some(_)))
    }

    /// The cached options of the previous launch, if readable.
    #[must_use]
    pub fn last_launch(&self) -> Option<LaunchOptions> {
        let raw = self.storage.get_item(LAST_LAUNCH_KEY).ok()??;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "ignoring malformed last launch"))
            .ok()
    }

    /// Launches the previously launched build again.
    ///
    /// Only the build name is replayed. The language falls back to
    /// [`DEFAULT_LANGUAGE`] and no token is sent, so a token cached before a
    /// logout never reaches the game.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Config`] when nothing is cached, otherwise the
    /// result of [`launch`](Self::launch).
    pub async fn quick_launch(&self) -> Result<(), LauncherError> {
        let Some(options) = self.last_launch() else {
            self.logs.add_error_log(NO_QUICK_LAUNCH_MESSAGE);
            return Err(LauncherError::config(NO_QUICK_LAUNCH_MESSAGE));
        };
        self.launch(&options.build_name, None, None).await
    }

    #[must_use]
    pub fn is_launching(&self) -> bool {
        self.is_launching.get()
    }

    #[must_use]
    pub fn launch_error(&self) -> LaunchError {
        self.launch_error.get()
    }

    /// Hides the error banner, keeping the code.
    pub fn dismiss_error(&self) {
        self.launch_error.update(|state| state.show = false);
    }

    #[must_use]
    pub fn subscribe_launching(&self) -> watch::Receiver<bool> {
        self.is_launching.subscribe()
    }

    #[must_use]
    pub fn subscribe_error(&self) -> watch::Receiver<LaunchError> {
        self.launch_error.subscribe()
    }

    /// Resets both UI states. The cached last launch is kept.
    pub fn reset(&self) {
        self.is_launching.set(false);
        self.launch_error.set(LaunchError::default());
    }

    fn remember(&self, options: &LaunchOptions) {
        let stored = serde_json::to_string(options)
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.set_item(LAST_LAUNCH_KEY, &raw));
        if let Err(error) = stored {
            warn!(error = %error, "could not cache last launch");
        }
    }
}

impl fmt::Debug for LaunchStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchStore")
            .field("is_launching", &self.is_launching.get())
            .field("launch_error", &self.launch_error.get())
            .finish_non_exhaustive()
    }
}
