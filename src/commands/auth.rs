//! Interactive authorization: open the consent URL, paste back the code.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app_config;
use crate::session::{self, Session};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Out-of-band flow: the consent page shows the code for the user to paste.
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

pub async fn run() -> Result<()> {
    let creds = app_config::load()?;

    let mut auth_url = url::Url::parse(AUTH_URL).context("Failed to build authorization URL")?;
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", &creds.client_id)
        .append_pair("redirect_uri", OOB_REDIRECT_URI)
        .append_pair("response_type", "code")
        .append_pair("scope", SCOPE)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");

    eprintln!("\nOpen this URL in your browser and authorize access:\n");
    eprintln!("{}\n", auth_url);

    if open::that(auth_url.as_str()).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    eprintln!("Paste the authorization code here and press Enter:");

    let mut code = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut code)
        .await
        .context("Failed to read authorization code")?;
    let code = code.trim();

    if code.is_empty() {
        anyhow::bail!("No authorization code entered");
    }

    eprintln!("\nExchanging code for tokens...");

    let data = session::exchange_code(&creds, OOB_REDIRECT_URI, code).await?;
    Session::new(data).save()?;

    eprintln!("Authorization successful! You can now run `caltask-cli sync`.");

    Ok(())
}
