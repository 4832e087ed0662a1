//! Config command handler: show effective configuration.

use anyhow::Result;

use crate::app_config::LoadedConfig;
use crate::settings::Settings;

pub fn run_config_show_command(loaded_config: &LoadedConfig, settings: &Settings) -> Result<()> {
    let resolved_path = loaded_config.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded_config.loaded_from_file() {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!("base_url = {}", settings.api.base_url);
    println!(
        "port = {}",
        settings
            .api
            .port
            .map_or_else(|| "<none>".to_string(), |port| port.to_string())
    );
    println!("channel = {}", settings.api.channel);
    println!("data_dir = {}", settings.data_dir.display());
    println!("language = {}", settings.language);
    println!("manifest_url = {}", settings.native.manifest_url);
    println!("downloads_url = {}", settings.native.downloads_url);
    println!("swfs_url = {}", settings.native.swfs_url);
    println!("connect_timeout_secs = {}", settings.http.connect_timeout_secs);
    println!("read_timeout_secs = {}", settings.http.read_timeout_secs);

    Ok(())
}
