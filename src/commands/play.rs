//! Launch command handlers.

use anyhow::{Context, Result};
use launcher_core::LauncherContext;
use tracing::{info, warn};

use super::user_facing;
use crate::cli::LaunchArgs;

pub async fn run_launch_command(
    ctx: &LauncherContext,
    args: &LaunchArgs,
    default_language: &str,
) -> Result<()> {
    ctx.init().await.context("Failed to initialize the launcher")?;

    let session = ctx.sessions.session();
    let token = if args.no_token { None } else { session.token() };
    if token.is_none() && !args.no_token {
        warn!("not logged in; launching without a session token");
    }
    let language = args
        .language
        .as_deref()
        .unwrap_or(default_language)
        .to_lowercase();

    ctx.launch
        .launch(&args.build, Some(&language), token)
        .await
        .map_err(|e| user_facing(&e))?;

    println!("Launched build {}", args.build);
    Ok(())
}

pub async fn run_quick_launch_command(ctx: &LauncherContext) -> Result<()> {
    // Nothing cached means nothing to prepare.
    if ctx.launch.is_quick_launch_enabled() {
        ctx.init().await.context("Failed to initialize the launcher")?;
    }

    ctx.launch.quick_launch().await.map_err(|e| user_facing(&e))?;

    if let Some(options) = ctx.launch.last_launch() {
        info!(language = %options.language, "quick launch replayed");
        println!("Launched build {}", options.build_name);
    }
    Ok(())
}
