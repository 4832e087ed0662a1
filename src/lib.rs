//! Launcher Core Library
//!
//! This library holds everything the game launcher does besides drawing
//! screens: validating account forms, talking to the versioned HTTP API,
//! keeping the logged-in session on disk, and launching game builds through
//! a native bridge.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`validation`] - Pure field validators for login and registration forms
//! - [`error`] - Unified error type and user-facing message normalization
//! - [`store`] - Observable single-writer state containers
//! - [`version`] - Current game version and the server version manifest
//! - [`http`] - Shared HTTP client construction
//! - [`api`] - Versioned API request client
//! - [`session`] - Persisted session plus local key-value storage
//! - [`auth`] - Login and registration flows
//! - [`bridge`] - Native bridge capability (commands and event channels)
//! - [`native`] - In-process bridge that downloads runtimes and spawns builds
//! - [`launch`] - Launch state, last-launch cache and quick launch
//! - [`debug_log`] - On-screen debug console log
//! - [`context`] - Bundles all stores with an explicit init/reset lifecycle

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod bridge;
pub mod context;
pub mod debug_log;
pub mod error;
pub mod http;
pub mod launch;
pub mod native;
pub mod session;
pub mod store;
mod user_agent;
pub mod validation;
pub mod version;

// Re-export commonly used types
pub use api::{ApiClient, ApiConfig, ApiResponse, DEFAULT_CHANNEL, Method};
pub use auth::{LoginOutcome, login, register};
pub use bridge::{BridgeError, EventHandler, NativeBridge, Subscription};
pub use context::LauncherContext;
pub use debug_log::{DebugLogStore, LogClass, LogEntry, setup_log_listeners};
pub use error::{
    CONNECT_ERROR_MESSAGE, DEFAULT_ERROR_MESSAGE, ErrorKind, ErrorValue, LauncherError,
    handle_error_message, handle_error_value,
};
pub use http::{HttpFetcher, HttpSettings};
pub use launch::{LaunchError, LaunchOptions, LaunchStore};
pub use native::{LocalBridge, NativeSettings};
pub use session::{FileStorage, MemoryStorage, Session, SessionStore, Storage, StorageError};
pub use store::Store;
pub use validation::{
    Credentials, FieldError, FormKind, validate_confirm_password, validate_email,
    validate_password, validate_username,
};
pub use version::{VersionManifest, VersionStore};
