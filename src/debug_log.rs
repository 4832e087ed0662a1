//! Debug console log.
//!
//! An ordered, append-only list of styled lines shown in the launcher's debug
//! console. The first entry is, by convention, the platform line emitted by
//! `initialize_app`. Every entry is mirrored to `tracing`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{error, info};

use crate::bridge::{ERROR_LOG_CHANNEL, INFO_LOG_CHANNEL, LogEvent, NativeBridge, Subscription};
use crate::store::Store;

/// Style tag of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogClass {
    #[serde(rename = "")]
    Info,
    #[serde(rename = "text-red-500")]
    Error,
    #[serde(rename = "text-green-500")]
    Success,
}

impl LogClass {
    /// CSS class the console renders the line with.
    #[must_use]
    pub fn style(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Error => "text-red-500",
            Self::Success => "text-green-500",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub class: LogClass,
    pub msg: String,
}

#[derive(Debug, Default)]
pub struct DebugLogStore {
    entries: Store<Vec<LogEntry>>,
}

impl DebugLogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_info_log(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "launcher::console", "{message}");
        self.push(LogClass::Info, message);
    }

    pub fn add_error_log(&self, message: impl Into<String>) {
        let message = message.into();
        error!(target: "launcher::console", "{message}");
        self.push(LogClass::Error, message);
    }

    pub fn add_success_log(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "launcher::console", success = true, "{message}");
        self.push(LogClass::Success, message);
    }

    fn push(&self, class: LogClass, msg: String) {
        self.entries.update(|entries| entries.push(LogEntry { class, msg }));
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.get()
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest_log(&self) -> Option<LogEntry> {
        self.entries.with(|entries| entries.last().cloned())
    }

    /// First entry, which carries the platform description.
    #[must_use]
    pub fn platform(&self) -> Option<LogEntry> {
        self.entries.with(|entries| entries.first().cloned())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.with(Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.set(Vec::new());
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<LogEntry>> {
        self.entries.subscribe()
    }
}

/// Forwards the bridge's `infoLog` and `errorLog` channels into `logs`.
///
/// Must be called before the bridge starts emitting, or early lines are lost.
/// Dropping the returned subscriptions stops forwarding.
pub fn setup_log_listeners(
    logs: &Arc<DebugLogStore>,
    bridge: &dyn NativeBridge,
) -> Vec<Subscription> {
    let info_logs = Arc::clone(logs);
    let info = bridge.subscribe(
        INFO_LOG_CHANNEL,
        Box::new(move |payload| info_logs.add_info_log(event_message(payload))),
    );

    let error_logs = Arc::clone(logs);
    let error = bridge.subscribe(
        ERROR_LOG_CHANNEL,
        Box::new(move |payload| error_logs.add_error_log(event_message(payload))),
    );

    vec![info, error]
}

fn event_message(payload: Value) -> String {
    match serde_json::from_value::<LogEvent>(payload.clone()) {
        Ok(event) => event.message,
        Err(_) => payload.to_string(),
    }
}
