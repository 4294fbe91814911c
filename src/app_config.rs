//! OAuth client credentials for the calendar account.
//!
//! User-provided, stored at ~/.config/caltask/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("caltask"))
}

fn config_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("config.toml"))
}

pub fn load() -> Result<Credentials> {
    let path = config_path()?;

    if !path.exists() {
        anyhow::bail!(
            "No OAuth client credentials at {}.\n\n\
            Register a \"Desktop app\" OAuth client in the Google Cloud console\n\
            (https://console.cloud.google.com/apis/credentials), then create the\n\
            file with its id and secret:\n\n\
            client_id = \"...apps.googleusercontent.com\"\n\
            client_secret = \"...\"",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let creds: Credentials =
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(creds)
}
