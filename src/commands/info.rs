//! Informational command handlers: init, languages, version and logs.

use anyhow::{Context, Result};
use launcher_core::{LauncherContext, LogClass, LogEntry};

use super::ensure_version;

pub async fn run_init_command(ctx: &LauncherContext) -> Result<()> {
    ctx.init().await.context("Failed to initialize the launcher")?;
    for entry in ctx.logs.entries() {
        println!("{}", render_log_entry(&entry));
    }
    Ok(())
}

pub async fn run_languages_command(ctx: &LauncherContext) -> Result<()> {
    ensure_version(ctx).await?;
    let languages = ctx.api.get_available_languages().await;
    if languages.is_empty() {
        println!("No languages available.");
    }
    for language in languages {
        println!("{language}");
    }
    Ok(())
}

pub async fn run_version_command(ctx: &LauncherContext) -> Result<()> {
    ensure_version(ctx).await?;
    println!("{}", ctx.version.get());
    Ok(())
}

pub async fn run_logs_command(ctx: &LauncherContext) -> Result<()> {
    ctx.init().await.context("Failed to initialize the launcher")?;
    if let Some(platform) = ctx.logs.platform() {
        println!("platform = {}", platform.msg);
    }
    for (index, entry) in ctx.logs.entries().iter().enumerate() {
        println!("{index:>3} {}", render_log_entry(entry));
    }
    Ok(())
}

fn render_log_entry(entry: &LogEntry) -> String {
    let label = match entry.class {
        LogClass::Info => "info ",
        LogClass::Error => "error",
        LogClass::Success => "ok   ",
    };
    format!("[{label}] {}", entry.msg)
}
