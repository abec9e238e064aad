use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{default_config_toml, CONFIG_FILE_NAME};

/// Write the default configuration into `dir`, returning the file path
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let contents = format!("# refdetect configuration\n\n{}", default_config_toml()?);
    fs::write(&config_path, contents)?;
    Ok(config_path)
}
