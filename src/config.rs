//! Environment configuration for the task tracker.

use anyhow::Result;
use caltask_core::CaltaskError;

/// Default target project when `--project` is not given.
pub const DEFAULT_PROJECT: &str = "Agenda";

/// Default sync window in days.
pub const DEFAULT_DAYS_AHEAD: i64 = 7;

pub struct EnvConfig {
    pub todoist_api_key: String,
}

/// Load environment configuration, reading a local `.env` file first when
/// one exists. A missing API key is fatal at startup.
pub fn load() -> Result<EnvConfig> {
    dotenvy::dotenv().ok();

    let todoist_api_key = std::env::var("TODOIST_API_KEY").map_err(|_| {
        CaltaskError::Config(
            "TODOIST_API_KEY is not set (export it or add it to a local .env file)".to_string(),
        )
    })?;

    Ok(EnvConfig { todoist_api_key })
}
