//! Error types shared by the request, session and launch layers.
//!
//! Every failure the launcher can hit (unreachable server, an HTTP error
//! body, a response that will not decode, a native bridge failure) is folded
//! into [`LauncherError`]. The UI never shows a structured error directly: it
//! runs the error through [`handle_error_message`] and displays the string.

use thiserror::Error;

use crate::bridge::BridgeError;
use crate::session::StorageError;

/// Message shown when the API server cannot be reached at all.
pub const CONNECT_ERROR_MESSAGE: &str = "Could not connect to the server. Please check the server status on our Discord. There may be an ongoing maintenance break or outage.";

/// Fallback message for errors that carry no usable text.
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Substring that marks a transport-level fetch failure.
pub const FETCH_FAILURE_MARKER: &str = "Failed to fetch";

/// Coarse classification of a [`LauncherError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure: DNS, refused connection, TLS, timeout.
    Network,
    /// The server answered with a non-2xx status.
    Http,
    /// The server answered but the body did not decode.
    Decode,
    /// The native bridge rejected a command.
    Native,
    /// Local persistent storage failed.
    Storage,
    /// The launcher is misconfigured (e.g. no API version known yet).
    Config,
    /// Anything else.
    Unknown,
}

/// Unified launcher error.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// The request never produced a response.
    #[error("Failed to fetch {url}: {detail}")]
    Network {
        /// The URL that was being requested.
        url: String,
        /// Transport error description.
        detail: String,
    },

    /// Non-2xx response; `message` comes from the JSON error body when present.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Human-readable message.
        message: String,
    },

    /// A 2xx body that does not match the expected shape.
    #[error("{message}")]
    Decode {
        /// Human-readable message.
        message: String,
    },

    /// Native bridge failure. `code` is kept for UI branching.
    #[error("{message}")]
    Native {
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// Local storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Missing or invalid configuration.
    #[error("{message}")]
    Config {
        /// Human-readable message.
        message: String,
    },

    /// Uncategorized failure.
    #[error("{message}")]
    Unknown {
        /// Human-readable message.
        message: String,
    },
}

impl LauncherError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a native bridge error.
    pub fn native(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Native {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an uncategorized error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Returns the error's classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Http { .. } => ErrorKind::Http,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Native { .. } => ErrorKind::Native,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Config { .. } => ErrorKind::Config,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Returns the machine-readable code, only present for native errors.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Native { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<BridgeError> for LauncherError {
    fn from(error: BridgeError) -> Self {
        Self::Native {
            code: error.code,
            message: error.message,
        }
    }
}

/// A failure value of unknown provenance, as caught by UI code.
#[derive(Debug)]
pub enum ErrorValue {
    /// A structured launcher error.
    Error(LauncherError),
    /// A bare message.
    Text(String),
    /// Something with no usable message at all.
    Unknown,
}

impl From<LauncherError> for ErrorValue {
    fn from(error: LauncherError) -> Self {
        Self::Error(error)
    }
}

impl From<String> for ErrorValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ErrorValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Maps an error to the message shown to the user.
///
/// Network failures, or anything whose message carries the fetch-failure
/// marker, collapse to [`CONNECT_ERROR_MESSAGE`]. Otherwise the error's own
/// trimmed message is used, falling back to [`DEFAULT_ERROR_MESSAGE`].
#[must_use]
pub fn handle_error_message(error: Option<&LauncherError>) -> String {
    let Some(error) = error else {
        return DEFAULT_ERROR_MESSAGE.to_string();
    };

    let rendered = error.to_string();
    let message = rendered.trim();

    if error.kind() == ErrorKind::Network || message.contains(FETCH_FAILURE_MARKER) {
        return CONNECT_ERROR_MESSAGE.to_string();
    }
    if message.is_empty() {
        return DEFAULT_ERROR_MESSAGE.to_string();
    }
    message.to_string()
}

/// Maps any caught value to the message shown to the user.
#[must_use]
pub fn handle_error_value(value: &ErrorValue) -> String {
    match value {
        ErrorValue::Error(error) => handle_error_message(Some(error)),
        ErrorValue::Text(text) => text.clone(),
        ErrorValue::Unknown => DEFAULT_ERROR_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_error_message_none_returns_default() {
        assert_eq!(handle_error_message(None), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_handle_error_message_network_returns_connect_message() {
        let error = LauncherError::network("http://localhost:3001/api/v1-beta/login", "refused");
        assert_eq!(handle_error_message(Some(&error)), CONNECT_ERROR_MESSAGE);
    }

    #[test]
    fn test_handle_error_message_marker_in_other_kind_returns_connect_message() {
        let error = LauncherError::unknown("TypeError: Failed to fetch");
        assert_eq!(handle_error_message(Some(&error)), CONNECT_ERROR_MESSAGE);
    }

    #[test]
    fn test_handle_error_message_passes_through_own_message() {
        let error = LauncherError::http(401, "Invalid password");
        assert_eq!(handle_error_message(Some(&error)), "Invalid password");
    }

    #[test]
    fn test_handle_error_message_trims_message() {
        let error = LauncherError::unknown("  Invalid password \n");
        assert_eq!(handle_error_message(Some(&error)), "Invalid password");
    }

    #[test]
    fn test_handle_error_message_blank_message_returns_default() {
        let error = LauncherError::http(500, "   ");
        assert_eq!(handle_error_message(Some(&error)), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_handle_error_value_variants() {
        assert_eq!(handle_error_value(&"plain text".into()), "plain text");
        assert_eq!(handle_error_value(&ErrorValue::Unknown), DEFAULT_ERROR_MESSAGE);
        let wrapped: ErrorValue = LauncherError::decode("bad body").into();
        assert_eq!(handle_error_value(&wrapped), "bad body");
    }

    #[test]
    fn test_native_error_keeps_code() {
        let error: LauncherError = BridgeError::new("E_MISSING_BUILD", "no build").into();
        assert_eq!(error.kind(), ErrorKind::Native);
        assert_eq!(error.code(), Some("E_MISSING_BUILD"));
        assert_eq!(error.to_string(), "no build");
    }
}
