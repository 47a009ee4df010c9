//! `chatrelay config` -- print the effective configuration.

use std::path::Path;

use anyhow::Result;
use console::style;

use chatrelay_infra::config::{CONFIG_FILE, render_config};
use chatrelay_types::config::RelayConfig;

pub fn show_config(config: &RelayConfig, data_dir: &Path) -> Result<()> {
    let config_path = data_dir.join(CONFIG_FILE);
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        "defaults (no config.toml)".to_string()
    };

    println!("{}", style(format!("# source: {source}")).dim());
    println!("{}", render_config(config)?);
    Ok(())
}
