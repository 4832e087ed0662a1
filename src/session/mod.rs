//! Logged-in session and its persistence.
//!
//! The session is saved as JSON under the `user` key of a [`Storage`] and
//! restored on start-up. At most one session is active per [`SessionStore`].

mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, default_data_dir};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::store::Store;

/// Storage key holding the serialized session.
pub const USER_KEY: &str = "user";

/// The logged-in user as persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Session {
    /// Whether the session carries an auth token.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }

    /// The token, if any, for passing to the game.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        (!self.token.is_empty()).then_some(self.token.as_str())
    }
}

/// Session state with explicit load/save/clear lifecycle.
#[derive(Debug)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    session: Store<Session>,
    remembered: Store<bool>,
}

impl SessionStore {
    /// Creates an empty store backed by `storage`. Nothing is read until [`load`](Self::load).
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            session: Store::default(),
            remembered: Store::new(false),
        }
    }

    /// Restores a persisted session.
    ///
    /// Returns `true` when a session was restored. Absent or malformed data
    /// leaves the current state untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only when the storage itself fails.
    pub fn load(&self) -> Result<bool, StorageError> {
        let Some(raw) = self.storage.get_item(USER_KEY)? else {
            debug!("no persisted session");
            return Ok(false);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                info!(email = %session.email, "restored persisted session");
                self.session.set(session);
                self.remembered.set(true);
                Ok(true)
            }
            Err(error) => {
                warn!(error = %error, "ignoring malformed persisted session");
                Ok(false)
            }
        }
    }

    /// Persists `session` and publishes it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if serialization or the write fails; the
    /// published state is unchanged in that case.
    pub fn save(&self, session: Session) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&session)?;
        self.storage.set_item(USER_KEY, &raw)?;
        debug!(email = %session.email, "session saved");
        self.session.set(session);
        self.remembered.set(true);
        Ok(())
    }

    /// Publishes `session` for this run only, without persisting it.
    pub fn publish(&self, session: Session) {
        self.session.set(session);
    }

    /// Removes the persisted session and resets to the empty default.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the stored key cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(USER_KEY)?;
        self.session.set(Session::default());
        self.remembered.set(false);
        info!("session cleared");
        Ok(())
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.get()
    }

    /// Whether the current session came from, or was written to, storage.
    #[must_use]
    pub fn is_remembered(&self) -> bool {
        self.remembered.get()
    }

    /// Observes session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }
}
