//! CLI command implementations.

pub mod check;
pub mod init;
pub mod sync;

pub use check::check_site;
pub use init::init_project;
pub use sync::sync_site;

use anyhow::{Context, Result};
use std::path::Path;
use vaultpub_core::Config;

/// Load the config file, or fall back to defaults anchored at the current directory
pub(crate) fn load_config(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        tracing::info!("Loading config from {:?}", config_path);
        return Config::from_file(config_path).context("Failed to load configuration");
    }

    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    tracing::info!(
        "No config at {:?}; using defaults relative to {:?}",
        config_path,
        cwd
    );
    Ok(Config::with_root(cwd))
}
