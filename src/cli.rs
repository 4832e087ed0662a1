//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Log in, pick a game build and launch it.
///
/// The launcher keeps your session between runs, downloads the flash
/// runtime for your platform and remembers the last launch so it can be
/// replayed with `quick-launch`.
#[derive(Parser, Debug)]
#[command(name = "launcher")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory for the session, last launch and runtimes
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// API scheme and host (e.g. https://api.example.com)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// API port
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// API release channel (e.g. beta, alpha)
    #[arg(long, global = true)]
    pub channel: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in; the password is read from stdin
    Login(LoginArgs),
    /// Create an account; password and confirmation are read from stdin
    Register(RegisterArgs),
    /// Forget the saved session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Launch a game build
    Launch(LaunchArgs),
    /// Replay the previous launch
    QuickLaunch,
    /// Fetch the server manifest and install the runtime
    Init,
    /// List the languages the server supports
    Languages,
    /// Print the server's current game version
    Version,
    /// Initialize and print the debug console
    Logs,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Account email
    pub email: String,

    /// Keep the session for this run only
    #[arg(long)]
    pub no_remember: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Username (2-12 letters, digits or underscores)
    pub username: String,

    /// Account email
    pub email: String,

    /// Keep the session for this run only
    #[arg(long)]
    pub no_remember: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LaunchArgs {
    /// Build name, e.g. stable, http or local
    pub build: String,

    /// Game language (defaults to the configured language)
    #[arg(short = 'L', long)]
    pub language: Option<String>,

    /// Launch without passing the session token
    #[arg(long)]
    pub no_token: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let cli = Cli::try_parse_from(["launcher", "-v", "whoami"]).unwrap();
        assert_eq!(cli.verbose, 1);

        let cli = Cli::try_parse_from(["launcher", "whoami", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let cli = Cli::try_parse_from(["launcher", "--quiet", "logout"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Cli::try_parse_from(["launcher", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Cli::try_parse_from(["launcher", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["launcher"]).is_err());
    }

    #[test]
    fn test_cli_launch_args() {
        let cli = Cli::try_parse_from([
            "launcher",
            "launch",
            "stable",
            "--language",
            "french",
            "--no-token",
        ])
        .unwrap();
        let Command::Launch(args) = cli.command else {
            panic!("expected launch");
        };
        assert_eq!(args.build, "stable");
        assert_eq!(args.language.as_deref(), Some("french"));
        assert!(args.no_token);
    }

    #[test]
    fn test_cli_quick_launch_is_kebab_case() {
        let cli = Cli::try_parse_from(["launcher", "quick-launch"]).unwrap();
        assert!(matches!(cli.command, Command::QuickLaunch));
    }

    #[test]
    fn test_cli_config_show() {
        let cli = Cli::try_parse_from(["launcher", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn test_cli_global_overrides() {
        let cli = Cli::try_parse_from([
            "launcher",
            "languages",
            "--data-dir",
            "/tmp/l",
            "--port",
            "3001",
            "--channel",
            "alpha",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/l")));
        assert_eq!(cli.port, Some(3001));
        assert_eq!(cli.channel.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_cli_port_zero_rejected() {
        let err = Cli::try_parse_from(["launcher", "--port", "0", "version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
