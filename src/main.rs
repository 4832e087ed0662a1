//! CLI entry point for the game launcher.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use launcher_core::{FileStorage, HttpFetcher, LauncherContext};
use tracing::{debug, info};

mod app_config;
mod cli;
mod commands;
mod settings;

use cli::{Cli, Command, ConfigAction};
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, "CLI arguments parsed");

    let loaded_config = app_config::load_default_file_config()?;
    let settings = Settings::resolve(&cli, loaded_config.config.as_ref())?;

    if let Command::Config {
        action: ConfigAction::Show,
    } = &cli.command
    {
        return commands::run_config_show_command(&loaded_config, &settings);
    }

    info!(data_dir = %settings.data_dir.display(), "Launcher starting");

    let fetcher = HttpFetcher::new(settings.http).context("Failed to build the HTTP client")?;
    let storage = Arc::new(FileStorage::new(&settings.data_dir));
    let ctx = LauncherContext::local(
        fetcher,
        settings.api.clone(),
        settings.native.clone(),
        storage,
    );
    ctx.sessions
        .load()
        .context("Failed to read the saved session")?;

    match &cli.command {
        Command::Login(args) => commands::run_login_command(&ctx, args).await,
        Command::Register(args) => commands::run_register_command(&ctx, args).await,
        Command::Logout => commands::run_logout_command(&ctx),
        Command::Whoami => commands::run_whoami_command(&ctx),
        Command::Launch(args) => {
            commands::run_launch_command(&ctx, args, &settings.language).await
        }
        Command::QuickLaunch => commands::run_quick_launch_command(&ctx).await,
        Command::Init => commands::run_init_command(&ctx).await,
        Command::Languages => commands::run_languages_command(&ctx).await,
        Command::Version => commands::run_version_command(&ctx).await,
        Command::Logs => commands::run_logs_command(&ctx).await,
        Command::Config { .. } => Ok(()),
    }
}
