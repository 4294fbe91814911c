//! Persisted OAuth session for the calendar account.
//!
//! Tokens live at ~/.config/caltask/session.toml, created by `caltask-cli
//! auth` and reloaded on every run. An expired access token is refreshed
//! against the token endpoint and the session file rewritten.

use anyhow::{Context, Result};
use caltask_core::CaltaskError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::app_config::{base_dir, Credentials};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

pub struct Session {
    data: SessionData,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    expires_in: i64,
}

/// Exchange an authorization code for tokens (initial authorization).
pub async fn exchange_code(
    creds: &Credentials,
    redirect_uri: &str,
    code: &str,
) -> Result<SessionData> {
    let params = [
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("redirect_uri", redirect_uri),
        ("code", code),
        ("grant_type", "authorization_code"),
    ];

    let response = reqwest::Client::new()
        .post(TOKEN_URL)
        .form(&params)
        .send()
        .await
        .context("Failed to reach the token endpoint")?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(
            CaltaskError::Auth(format!("Code exchange rejected: {}", error_text)).into(),
        );
    }

    let tokens: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token response")?;

    Ok(SessionData {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
    })
}

impl Session {
    fn path() -> Result<std::path::PathBuf> {
        Ok(base_dir()?.join("session.toml"))
    }

    pub fn new(data: SessionData) -> Self {
        Session { data }
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    /// Load the saved session, refreshing the access token if expired.
    pub async fn load_valid(creds: &Credentials) -> Result<Self> {
        let mut session = Self::load()?;

        if session.is_expired() {
            session.refresh(creds).await?;
        }

        Ok(session)
    }

    fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            return Err(CaltaskError::Auth(
                "No calendar authorization found. Run `caltask-cli auth` first.".to_string(),
            )
            .into());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;

        let data: SessionData = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))?;

        Ok(Session { data })
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Owner-only (0600): the file contains OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.data.expires_at
    }

    async fn refresh(&mut self, creds: &Credentials) -> Result<()> {
        let params = [
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", self.data.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = reqwest::Client::new()
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .context("Failed to reach the token endpoint")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CaltaskError::Auth(format!(
                "Token refresh rejected ({}). Run `caltask-cli auth` to re-authorize.",
                error_text
            ))
            .into());
        }

        #[derive(Deserialize)]
        struct RefreshResponse {
            access_token: String,
            expires_in: i64,
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .context("Failed to parse refresh response")?;

        // The provider does not return a new refresh token on refresh
        self.data.access_token = refreshed.access_token;
        self.data.expires_at = Utc::now() + Duration::seconds(refreshed.expires_in);
        self.save()?;

        Ok(())
    }
}
