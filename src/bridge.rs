//! Native bridge capability.
//!
//! UI-side code never spawns processes or touches the platform directly. It
//! asks a [`NativeBridge`] to run named commands and listens on named event
//! channels. [`LocalBridge`](crate::native::LocalBridge) is the in-process
//! implementation; tests substitute their own.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event channel carrying informational log lines.
pub const INFO_LOG_CHANNEL: &str = "infoLog";

/// Event channel carrying error log lines.
pub const ERROR_LOG_CHANNEL: &str = "errorLog";

/// Command that launches a game build.
pub const LAUNCH_GAME_COMMAND: &str = "launch_game";

/// Command that prepares runtimes and announces the platform.
pub const INITIALIZE_APP_COMMAND: &str = "initialize_app";

/// Command that returns the server's current game version.
pub const GET_CURRENT_GAME_VERSION_COMMAND: &str = "get_current_game_version";

/// Machine-readable bridge error codes.
pub mod codes {
    pub const UNKNOWN_COMMAND: &str = "E_UNKNOWN_COMMAND";
    pub const INVALID_ARGS: &str = "E_INVALID_ARGS";
    pub const MISSING_RUNTIME: &str = "E_MISSING_RUNTIME";
    pub const UNSUPPORTED_PLATFORM: &str = "E_UNSUPPORTED_PLATFORM";
    pub const LAUNCH_FAILED: &str = "E_LAUNCH_FAILED";
    pub const MANIFEST_UNAVAILABLE: &str = "E_MANIFEST_UNAVAILABLE";
    pub const DOWNLOAD_FAILED: &str = "E_DOWNLOAD_FAILED";
}

/// Failure reported by a bridge command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct BridgeError {
    pub code: String,
    pub message: String,
}

impl BridgeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Payload of the log event channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub message: String,
}

/// Callback invoked with each event payload.
pub type EventHandler = Box<dyn Fn(Value) + Send + Sync + 'static>;

/// Active event subscription. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stops delivering events.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keeps the subscription alive for the rest of the process.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Commands and events provided by the host platform.
#[async_trait]
pub trait NativeBridge: Send + Sync {
    /// Runs `command` with JSON `args`.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] carrying a machine-readable code.
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BridgeError>;

    /// Delivers every payload emitted on `channel` to `handler`.
    fn subscribe(&self, channel: &str, handler: EventHandler) -> Subscription;
}
