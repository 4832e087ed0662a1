//! CLI command handlers.

mod account;
mod config;
mod info;
mod play;

pub use account::{
    run_login_command, run_logout_command, run_register_command, run_whoami_command,
};
pub use config::run_config_show_command;
pub use info::{run_init_command, run_languages_command, run_logs_command, run_version_command};
pub use play::{run_launch_command, run_quick_launch_command};

use anyhow::anyhow;
use launcher_core::bridge::GET_CURRENT_GAME_VERSION_COMMAND;
use launcher_core::{LauncherContext, LauncherError, handle_error_message};
use serde_json::Value;
use tracing::debug;

/// Turns a library error into the message the user should see.
pub(crate) fn user_facing(error: &LauncherError) -> anyhow::Error {
    anyhow!(handle_error_message(Some(error)))
}

/// Makes sure API URLs can be built, asking the bridge for the version if needed.
pub(crate) async fn ensure_version(ctx: &LauncherContext) -> anyhow::Result<()> {
    if ctx.version.is_set() {
        return Ok(());
    }
    let version = ctx
        .bridge()
        .invoke(GET_CURRENT_GAME_VERSION_COMMAND, Value::Null)
        .await
        .map_err(|e| user_facing(&LauncherError::from(e)))?;
    if let Value::String(version) = version {
        ctx.version.set(&version);
    }
    debug!(version = %ctx.version.get(), "API version resolved");
    Ok(())
}
