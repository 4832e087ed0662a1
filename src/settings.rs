//! Effective settings: CLI flags over the config file over built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use launcher_core::api::DEFAULT_BASE_URL;
use launcher_core::launch::DEFAULT_LANGUAGE;
use launcher_core::native::{DEFAULT_DOWNLOADS_URL, DEFAULT_MANIFEST_URL, DEFAULT_SWFS_URL};
use launcher_core::session::default_data_dir;
use launcher_core::{ApiConfig, DEFAULT_CHANNEL, HttpSettings, NativeSettings};

use crate::app_config::FileConfig;
use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    pub data_dir: PathBuf,
    pub language: String,
    pub native: NativeSettings,
    pub http: HttpSettings,
}

impl Settings {
    /// Merges `cli` over `file` over defaults.
    pub fn resolve(cli: &Cli, file: Option<&FileConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let data_dir = match cli.data_dir.clone().or(file.data_dir) {
            Some(dir) => dir,
            None => default_data_dir().context("Cannot determine a data directory; pass --data-dir")?,
        };

        let channel = cli
            .channel
            .clone()
            .or(file.channel)
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
        if channel.is_empty() || !channel.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("Invalid channel '{channel}': expected letters and digits");
        }

        let api = ApiConfig {
            base_url: cli
                .base_url
                .clone()
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            port: cli.port.or(file.port),
            channel,
        };

        let defaults = HttpSettings::default();
        let http = HttpSettings {
            connect_timeout_secs: file
                .connect_timeout_secs
                .unwrap_or(defaults.connect_timeout_secs),
            read_timeout_secs: file.read_timeout_secs.unwrap_or(defaults.read_timeout_secs),
        };

        let mut native = NativeSettings::with_data_dir(&data_dir);
        native.manifest_url = file
            .manifest_url
            .unwrap_or_else(|| DEFAULT_MANIFEST_URL.to_string());
        native.downloads_url = file
            .downloads_url
            .unwrap_or_else(|| DEFAULT_DOWNLOADS_URL.to_string());
        native.swfs_url = file.swfs_url.unwrap_or_else(|| DEFAULT_SWFS_URL.to_string());

        Ok(Self {
            api,
            data_dir,
            language: file
                .language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            native,
            http,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("launcher").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::resolve(&cli(&["--data-dir", "/tmp/l", "whoami"]), None).unwrap();
        assert_eq!(settings.api, ApiConfig::default());
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/l"));
        assert_eq!(settings.language, "english");
        assert_eq!(settings.native.runtimes_dir, PathBuf::from("/tmp/l/runtimes"));
        assert_eq!(settings.native.swfs_url, DEFAULT_SWFS_URL);
        assert_eq!(settings.http.read_timeout_secs, 300);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = FileConfig {
            base_url: Some("https://api.example.com".to_string()),
            port: Some(8443),
            channel: Some("alpha".to_string()),
            data_dir: Some(PathBuf::from("/srv/launcher")),
            language: Some("german".to_string()),
            read_timeout_secs: Some(20),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&cli(&["whoami"]), Some(&file)).unwrap();
        assert_eq!(settings.api.base_url, "https://api.example.com");
        assert_eq!(settings.api.port, Some(8443));
        assert_eq!(settings.api.channel, "alpha");
        assert_eq!(settings.data_dir, PathBuf::from("/srv/launcher"));
        assert_eq!(settings.language, "german");
        assert_eq!(settings.http.read_timeout_secs, 20);
        assert_eq!(settings.http.connect_timeout_secs, 30);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            port: Some(8443),
            channel: Some("alpha".to_string()),
            data_dir: Some(PathBuf::from("/srv/launcher")),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(
            &cli(&["--port", "3001", "--channel", "beta", "--data-dir", "/tmp/x", "whoami"]),
            Some(&file),
        )
        .unwrap();
        assert_eq!(settings.api.port, Some(3001));
        assert_eq!(settings.api.channel, "beta");
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_cli_channel_is_validated() {
        let err = Settings::resolve(
            &cli(&["--channel", "be ta", "--data-dir", "/tmp/x", "whoami"]),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("channel"));
    }
}
