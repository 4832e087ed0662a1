//! In-process native bridge.
//!
//! [`LocalBridge`] implements [`NativeBridge`] without a desktop shell: it
//! fetches the server manifest, downloads the flash runtime for the current
//! platform, and spawns it with the URL of the requested game build. Log
//! lines go out on the `infoLog`/`errorLog` channels; listeners run on the
//! emitting task, so a line is recorded before the command that emitted it
//! returns.

pub mod runtime;

use std::env;
use std::path::PathBuf;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

use crate::bridge::{
    BridgeError, ERROR_LOG_CHANNEL, EventHandler, GET_CURRENT_GAME_VERSION_COMMAND,
    INFO_LOG_CHANNEL, INITIALIZE_APP_COMMAND, LAUNCH_GAME_COMMAND, NativeBridge, Subscription,
    codes,
};
use crate::http::HttpFetcher;
use crate::launch::LaunchOptions;
use crate::version::{VersionManifest, VersionStore, fetch_server_manifest};

/// Manifest location (host and path, no scheme).
pub const DEFAULT_MANIFEST_URL: &str = "api.bymrefitted.com/launcher.json";

/// Runtime download prefix (host and path, no scheme).
pub const DEFAULT_DOWNLOADS_URL: &str = "api.bymrefitted.com/launcher/downloads/";

/// Game build prefix (host and path, no scheme).
pub const DEFAULT_SWFS_URL: &str = "api.bymrefitted.com/launcher/downloads/swfs/";

/// Where the bridge finds and stores its assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSettings {
    pub manifest_url: String,
    pub downloads_url: String,
    pub swfs_url: String,
    /// Directory runtimes are downloaded into.
    pub runtimes_dir: PathBuf,
    /// Use this runtime instead of the one named by the manifest.
    pub runtime_path: Option<PathBuf>,
}

impl NativeSettings {
    /// Default URLs with runtimes stored under `data_dir/runtimes`.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            downloads_url: DEFAULT_DOWNLOADS_URL.to_string(),
            swfs_url: DEFAULT_SWFS_URL.to_string(),
            runtimes_dir: data_dir.into().join("runtimes"),
            runtime_path: None,
        }
    }
}

type Listener = (u64, String, Arc<dyn Fn(Value) + Send + Sync>);

/// Handlers registered per channel, called in subscription order.
#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: Arc<Mutex<Vec<Listener>>>,
}

impl Listeners {
    fn add(&self, channel: &str, handler: EventHandler) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, channel.to_string(), Arc::from(handler)));

        let entries = Arc::downgrade(&self.entries);
        Subscription::new(move || {
            if let Some(entries) = entries.upgrade() {
                entries
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|(listener, _, _)| *listener != id);
            }
        })
    }

    fn notify(&self, channel: &str, payload: &Value) {
        // Handlers run unlocked so they may subscribe or unsubscribe.
        let handlers: Vec<_> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, listener_channel, _)| listener_channel == channel)
            .map(|(_, _, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(payload.clone());
        }
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}

/// Bridge that runs every command inside this process.
#[derive(Debug)]
pub struct LocalBridge {
    fetcher: HttpFetcher,
    settings: NativeSettings,
    version: Arc<VersionStore>,
    listeners: Listeners,
    manifest: Mutex<Option<VersionManifest>>,
    os: String,
}

impl LocalBridge {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, settings: NativeSettings, version: Arc<VersionStore>) -> Self {
        Self {
            fetcher,
            settings,
            version,
            listeners: Listeners::default(),
            manifest: Mutex::new(None),
            os: env::consts::OS.to_string(),
        }
    }

    /// Overrides the platform name used to pick a runtime.
    #[must_use]
    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = os.into();
        self
    }

    /// Sends `message` to every listener of `channel`.
    pub fn emit(&self, channel: &str, message: impl Into<String>) {
        let message = message.into();
        debug!(channel, message = %message, "emitting bridge event");
        self.listeners.notify(channel, &json!({ "message": message }));
    }

    /// Announces the platform, refreshes the manifest and makes sure the
    /// runtime for this platform is on disk.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] when no runtime can be resolved or downloaded.
    /// Returned errors are not emitted on `errorLog`; reporting them is up to
    /// the caller.
    pub async fn initialize_app(&self) -> Result<(), BridgeError> {
        self.emit(
            INFO_LOG_CHANNEL,
            format!("Platform: {} {}", env::consts::OS, env::consts::ARCH),
        );

        let use_https = match self.refresh_manifest().await {
            Ok(manifest) => {
                self.emit(
                    INFO_LOG_CHANNEL,
                    format!(
                        "Connected successfully to the server.\n Current SWF version: {}\n Launcher connected via http{}",
                        manifest.current_game_version,
                        if manifest.https_worked { "s" } else { "" }
                    ),
                );
                manifest.https_worked
            }
            Err(error) => {
                self.emit(ERROR_LOG_CHANNEL, error.message);
                false
            }
        };

        if let Some(path) = &self.settings.runtime_path {
            debug!(path = %path.display(), "using configured runtime");
            return Ok(());
        }

        let file_name = self.runtime_file_name()?;
        let path = self.settings.runtimes_dir.join(&file_name);
        if path.exists() {
            debug!(path = %path.display(), "runtime already present");
            return Ok(());
        }

        self.emit(
            INFO_LOG_CHANNEL,
            "Downloading flash player for your platform...",
        );
        let scheme = if use_https { "https" } else { "http" };
        let url = format!("{scheme}://{}{file_name}", self.settings.downloads_url);
        runtime::download_file(&self.fetcher, &url, &path).await?;
        runtime::mark_executable(&path).map_err(|e| {
            BridgeError::new(
                codes::DOWNLOAD_FAILED,
                format!("could not make {} executable: {e}", path.display()),
            )
        })?;
        self.emit(INFO_LOG_CHANNEL, "Flash player downloaded");
        Ok(())
    }

    /// Spawns the runtime with the URL of the requested build.
    ///
    /// # Errors
    ///
    /// Returns `E_INVALID_ARGS` for a malformed build name,
    /// `E_MISSING_RUNTIME` when the runtime is not on disk, and
    /// `E_LAUNCH_FAILED` when the process cannot be spawned.
    pub async fn launch_game(&self, options: &LaunchOptions) -> Result<Value, BridgeError> {
        let swf_url = swf_url(
            &self.settings.swfs_url,
            &options.build_name,
            &options.language,
            options.token.as_deref(),
        )?;

        let runtime_path = match &self.settings.runtime_path {
            Some(path) => path.clone(),
            None => {
                if self.cached_manifest().is_none() {
                    self.refresh_manifest().await?;
                }
                self.settings.runtimes_dir.join(self.runtime_file_name()?)
            }
        };

        if !runtime_path.exists() {
            warn!(path = %runtime_path.display(), "runtime not found");
            return Err(BridgeError::new(
                codes::MISSING_RUNTIME,
                format!("cannot find flashplayer: {}", runtime_path.display()),
            ));
        }

        info!(runtime = %runtime_path.display(), build = %options.build_name, "opening game");
        let child = Command::new(&runtime_path)
            .arg(swf_url.as_str())
            .spawn()
            .map_err(|e| {
                BridgeError::new(
                    codes::LAUNCH_FAILED,
                    format!("Failed to start build {}: {e}", options.build_name),
                )
            })?;

        self.emit(
            INFO_LOG_CHANNEL,
            format!("Launched build {}", options.build_name),
        );
        Ok(json!({ "pid": child.id() }))
    }

    async fn refresh_manifest(&self) -> Result<VersionManifest, BridgeError> {
        let manifest = fetch_server_manifest(&self.fetcher, &self.settings.manifest_url)
            .await
            .map_err(|e| BridgeError::new(codes::MANIFEST_UNAVAILABLE, e.to_string()))?;
        self.version.refresh_from(&manifest);
        *self.manifest.lock().unwrap_or_else(PoisonError::into_inner) = Some(manifest.clone());
        Ok(manifest)
    }

    fn cached_manifest(&self) -> Option<VersionManifest> {
        self.manifest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn runtime_file_name(&self) -> Result<String, BridgeError> {
        let manifest = self.cached_manifest().ok_or_else(|| {
            BridgeError::new(
                codes::MANIFEST_UNAVAILABLE,
                "Server manifest could not be retrieved. Please check your internet connection.",
            )
        })?;
        runtime::platform_runtime(&manifest.flash_runtimes, &self.os)
    }
}

#[async_trait]
impl NativeBridge for LocalBridge {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BridgeError> {
        match command {
            INITIALIZE_APP_COMMAND => self.initialize_app().await.map(|()| Value::Null),
            LAUNCH_GAME_COMMAND => {
                let options: LaunchOptions = serde_json::from_value(args).map_err(|e| {
                    BridgeError::new(codes::INVALID_ARGS, format!("invalid launch options: {e}"))
                })?;
                self.launch_game(&options).await
            }
            GET_CURRENT_GAME_VERSION_COMMAND => {
                let manifest = self.refresh_manifest().await?;
                Ok(Value::String(manifest.current_game_version))
            }
            other => Err(BridgeError::new(
                codes::UNKNOWN_COMMAND,
                format!("unknown command: {other}"),
            )),
        }
    }

    fn subscribe(&self, channel: &str, handler: EventHandler) -> Subscription {
        self.listeners.add(channel, handler)
    }
}

/// Builds the URL the runtime opens for `build_name`.
///
/// Builds named `http` and `local` are served over plain HTTP.
///
/// # Errors
///
/// Returns `E_INVALID_ARGS` for build names outside `[A-Za-z0-9_-]` or an
/// unparseable URL.
pub fn swf_url(
    swfs_url: &str,
    build_name: &str,
    language: &str,
    token: Option<&str>,
) -> Result<Url, BridgeError> {
    let valid_name = !build_name.is_empty()
        && build_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid_name {
        return Err(BridgeError::new(
            codes::INVALID_ARGS,
            format!("invalid build name: '{build_name}'"),
        ));
    }

    let scheme = if build_name == "http" || build_name == "local" {
        "http"
    } else {
        "https"
    };
    let mut url = Url::parse(&format!("{scheme}://{swfs_url}bymr-{build_name}.swf"))
        .map_err(|e| BridgeError::new(codes::INVALID_ARGS, format!("invalid build URL: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("language", &language.to_lowercase());
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            query.append_pair("token", token);
        }
    }
    Ok(url)
}
