//! Configuration file loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use url::Url;

/// File configuration for launcher defaults. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// API scheme and host.
    pub base_url: Option<String>,
    /// API port.
    pub port: Option<u16>,
    /// API release channel.
    pub channel: Option<String>,
    /// Directory holding the session, the last launch and runtimes.
    pub data_dir: Option<PathBuf>,
    /// Game language used when `launch` is given none.
    pub language: Option<String>,
    /// Manifest location, host and path without scheme.
    pub manifest_url: Option<String>,
    /// Runtime download prefix, host and path without scheme.
    pub downloads_url: Option<String>,
    /// Game build prefix, host and path without scheme.
    pub swfs_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            let parsed = Url::parse(base_url).with_context(|| {
                format!("Invalid config value for `base_url`: '{base_url}'")
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("Invalid config value for `base_url`: '{base_url}'. Expected an http or https URL");
            }
        }

        if self.port == Some(0) {
            bail!("Invalid config value for `port`: 0. Expected range: 1..=65535");
        }

        if let Some(channel) = &self.channel
            && (channel.is_empty() || !channel.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            bail!("Invalid config value for `channel`: '{channel}'. Expected letters and digits");
        }

        if let Some(language) = &self.language
            && language.trim().is_empty()
        {
            bail!("Invalid config value for `language`: must not be empty");
        }

        validate_host_path("manifest_url", self.manifest_url.as_deref())?;
        validate_host_path("downloads_url", self.downloads_url.as_deref())?;
        validate_host_path("swfs_url", self.swfs_url.as_deref())?;
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;

        Ok(())
    }
}

fn validate_host_path(field: &str, value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if value.is_empty() || value.contains("://") {
        bail!("Invalid config value for `{field}`: '{value}'. Expected host and path without a scheme");
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/launcher/config.toml`
/// 2. `$HOME/.config/launcher/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("launcher")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("launcher")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let string_value = || {
            parse_string_literal(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };
        let integer_value = || {
            parse_integer_u64(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };

        match key {
            "base_url" => cfg.base_url = Some(string_value()?),
            "port" => {
                let parsed = integer_value()?;
                let port = u16::try_from(parsed).with_context(|| {
                    format!("Invalid `port` value on line {line_no}: {parsed} is out of range")
                })?;
                cfg.port = Some(port);
            }
            "channel" => cfg.channel = Some(string_value()?),
            "data_dir" => cfg.data_dir = Some(PathBuf::from(string_value()?)),
            "language" => cfg.language = Some(string_value()?.to_lowercase()),
            "manifest_url" => cfg.manifest_url = Some(string_value()?),
            "downloads_url" => cfg.downloads_url = Some(string_value()?),
            "swfs_url" => cfg.swfs_url = Some(string_value()?),
            "connect_timeout_secs" => cfg.connect_timeout_secs = Some(integer_value()?),
            "read_timeout_secs" => cfg.read_timeout_secs = Some(integer_value()?),
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
base_url = "https://api.example.com"
channel = "alpha"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(cfg.channel.as_deref(), Some("alpha"));
        assert!(cfg.port.is_none());
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
base_url = "http://localhost"
port = 3001
channel = "beta"
data_dir = "/tmp/launcher"
language = "French"
manifest_url = "localhost:3001/launcher.json"
downloads_url = "localhost:3001/downloads/"
swfs_url = "localhost:3001/swfs/"
connect_timeout_secs = 5
read_timeout_secs = 60
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.port, Some(3001));
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/launcher")));
        assert_eq!(cfg.language.as_deref(), Some("french"));
        assert_eq!(cfg.swfs_url.as_deref(), Some("localhost:3001/swfs/"));
        assert_eq!(cfg.connect_timeout_secs, Some(5));
        assert_eq!(cfg.read_timeout_secs, Some(60));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
port = 8080 # local server
channel = "alpha" # pre-release
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.port, Some(8080));
        assert_eq!(cfg.channel.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_parse_config_rejects_port_out_of_range() {
        let err = parse_config_str("port = 70000").expect_err("port above u16 expected");
        assert!(err.to_string().contains("port"));
        let err = parse_config_str("port = 0").expect_err("port zero expected");
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_parse_config_rejects_bad_base_url() {
        let err =
            parse_config_str(r#"base_url = "ftp://example.com""#).expect_err("ftp rejected");
        assert!(err.to_string().contains("base_url"));
        let err = parse_config_str(r#"base_url = "not a url""#).expect_err("garbage rejected");
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_parse_config_rejects_scheme_in_host_paths() {
        let err = parse_config_str(r#"swfs_url = "https://cdn.example.com/swfs/""#)
            .expect_err("scheme rejected");
        assert!(err.to_string().contains("swfs_url"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err =
            parse_config_str("read_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("read_timeout_secs"));
        let err = parse_config_str("connect_timeout_secs = 3601")
            .expect_err("invalid timeout expected");
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_strings() {
        let err = parse_config_str("channel = beta").expect_err("quotes required");
        assert!(err.to_string().contains("channel"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("port 3001").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }
}
