//! Application context.
//!
//! [`LauncherContext`] owns every store the launcher needs and wires them to
//! one API client and one native bridge. Front ends create one per run,
//! call [`init`](LauncherContext::init) once, and pass it around by
//! reference.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiConfig};
use crate::bridge::{
    GET_CURRENT_GAME_VERSION_COMMAND, INITIALIZE_APP_COMMAND, NativeBridge, Subscription,
};
use crate::debug_log::{DebugLogStore, setup_log_listeners};
use crate::error::LauncherError;
use crate::http::HttpFetcher;
use crate::launch::LaunchStore;
use crate::native::{LocalBridge, NativeSettings};
use crate::session::{SessionStore, Storage};
use crate::store::Store;
use crate::version::VersionStore;

pub struct LauncherContext {
    pub version: Arc<VersionStore>,
    pub sessions: Arc<SessionStore>,
    pub logs: Arc<DebugLogStore>,
    pub launch: Arc<LaunchStore>,
    pub api: ApiClient,
    bridge: Arc<dyn NativeBridge>,
    has_loaded: Store<bool>,
    listeners: Mutex<Vec<Subscription>>,
}

impl LauncherContext {
    /// Wires the stores to `bridge`.
    ///
    /// `version` must be the same store the bridge publishes into, so that
    /// API URLs follow the server manifest.
    #[must_use]
    pub fn new(
        fetcher: HttpFetcher,
        api_config: ApiConfig,
        storage: Arc<dyn Storage>,
        bridge: Arc<dyn NativeBridge>,
        version: Arc<VersionStore>,
    ) -> Self {
        let logs = Arc::new(DebugLogStore::new());
        let sessions = Arc::new(SessionStore::new(Arc::clone(&storage)));
        let launch = Arc::new(LaunchStore::new(
            Arc::clone(&bridge),
            storage,
            Arc::clone(&logs),
        ));
        let api = ApiClient::new(fetcher, api_config, Arc::clone(&version));

        Self {
            version,
            sessions,
            logs,
            launch,
            api,
            bridge,
            has_loaded: Store::new(false),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Context backed by the in-process [`LocalBridge`].
    #[must_use]
    pub fn local(
        fetcher: HttpFetcher,
        api_config: ApiConfig,
        native: NativeSettings,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let version = Arc::new(VersionStore::default());
        let bridge = Arc::new(LocalBridge::new(
            fetcher.clone(),
            native,
            Arc::clone(&version),
        ));
        Self::new(fetcher, api_config, storage, bridge, version)
    }

    #[must_use]
    pub fn bridge(&self) -> &Arc<dyn NativeBridge> {
        &self.bridge
    }

    /// Start-up sequence: attach log listeners, restore the session and
    /// initialize the native side.
    ///
    /// Bridge failures are written to the debug log and do not fail `init`;
    /// the launcher stays usable offline.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Storage`] when the session storage cannot be
    /// read.
    pub async fn init(&self) -> Result<(), LauncherError> {
        {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            if listeners.is_empty() {
                *listeners = setup_log_listeners(&self.logs, self.bridge.as_ref());
            }
        }

        if self.sessions.load()? {
            debug!("session restored during init");
        }

        if let Err(error) = self.bridge.invoke(INITIALIZE_APP_COMMAND, Value::Null).await {
            warn!(code = %error.code, "native initialization failed");
            self.logs.add_error_log(error.message);
        }

        if !self.version.is_set() {
            match self
                .bridge
                .invoke(GET_CURRENT_GAME_VERSION_COMMAND, Value::Null)
                .await
            {
                Ok(Value::String(version)) => self.version.set(&version),
                Ok(other) => warn!(value = %other, "unexpected game version payload"),
                Err(error) => warn!(error = %error, "game version unavailable"),
            }
        }

        self.has_loaded.set(true);
        info!(version = %self.version.get(), "launcher initialized");
        Ok(())
    }

    /// Whether [`init`](Self::init) has completed.
    #[must_use]
    pub fn has_loaded(&self) -> bool {
        self.has_loaded.get()
    }

    #[must_use]
    pub fn subscribe_loaded(&self) -> watch::Receiver<bool> {
        self.has_loaded.subscribe()
    }

    /// Detaches listeners and resets in-memory state. Persisted data stays.
    pub fn reset(&self) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.launch.reset();
        self.logs.clear();
        self.version.reset();
        self.has_loaded.set(false);
        debug!("launcher context reset");
    }
}

impl std::fmt::Debug for LauncherContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LauncherContext")
            .field("version", &self.version.get())
            .field("has_loaded", &self.has_loaded.get())
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::bridge::{BridgeError, EventHandler, INFO_LOG_CHANNEL, codes};
    use crate::session::{MemoryStorage, Session, USER_KEY};

    /// Bridge that announces a platform line on init and knows one version.
    #[derive(Default)]
    struct ScriptedBridge {
        handlers: Mutex<Vec<(String, EventHandler)>>,
        inits: AtomicUsize,
    }

    #[async_trait]
    impl NativeBridge for ScriptedBridge {
        async fn invoke(&self, command: &str, _args: Value) -> Result<Value, BridgeError> {
            match command {
                INITIALIZE_APP_COMMAND => {
                    self.inits.fetch_add(1, Ordering::SeqCst);
                    for (channel, handler) in self.handlers.lock().unwrap().iter() {
                        if channel == INFO_LOG_CHANNEL {
                            handler(json!({"message": "Platform: test"}));
                        }
                    }
                    Err(BridgeError::new(codes::MANIFEST_UNAVAILABLE, "offline"))
                }
                GET_CURRENT_GAME_VERSION_COMMAND => Ok(json!("0.3.1")),
                other => Err(BridgeError::new(codes::UNKNOWN_COMMAND, other)),
            }
        }

        fn subscribe(&self, channel: &str, handler: EventHandler) -> Subscription {
            self.handlers
                .lock()
                .unwrap()
                .push((channel.to_string(), handler));
            Subscription::new(|| {})
        }
    }

    fn context(storage: Arc<MemoryStorage>, bridge: Arc<ScriptedBridge>) -> LauncherContext {
        LauncherContext::new(
            HttpFetcher::with_defaults().unwrap(),
            ApiConfig::default(),
            storage,
            bridge,
            Arc::new(VersionStore::default()),
        )
    }

    #[tokio::test]
    async fn test_init_restores_session_and_version() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(USER_KEY, r#"{"email":"a@b.cd","token":"tok"}"#)
            .unwrap();
        let ctx = context(storage, Arc::new(ScriptedBridge::default()));
        assert!(!ctx.has_loaded());

        ctx.init().await.unwrap();

        assert!(ctx.has_loaded());
        assert_eq!(ctx.sessions.session().token(), Some("tok"));
        assert_eq!(ctx.version.get(), "0.3.1");
        assert_eq!(ctx.logs.platform().unwrap().msg, "Platform: test");
        assert_eq!(ctx.logs.latest_log().unwrap().msg, "offline");
    }

    #[tokio::test]
    async fn test_reset_clears_memory_but_keeps_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = context(storage.clone(), Arc::new(ScriptedBridge::default()));
        ctx.init().await.unwrap();
        ctx.sessions
            .save(Session {
                email: "a@b.cd".to_string(),
                token: "tok".to_string(),
                ..Session::default()
            })
            .unwrap();

        ctx.reset();

        assert!(!ctx.has_loaded());
        assert!(ctx.logs.is_empty());
        assert!(!ctx.version.is_set());
        assert!(storage.get_item(USER_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_init_twice_does_not_duplicate_listeners() {
        let bridge = Arc::new(ScriptedBridge::default());
        let ctx = context(Arc::new(MemoryStorage::new()), Arc::clone(&bridge));
        ctx.init().await.unwrap();
        ctx.init().await.unwrap();

        assert_eq!(bridge.inits.load(Ordering::SeqCst), 2);
        assert_eq!(bridge.handlers.lock().unwrap().len(), 2);
    }
}
