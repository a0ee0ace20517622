use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Google "authorized user" credentials, the token.json written by the
/// consent flow. Only the refresh triple is required; a cached access
/// token and its expiry may ride along.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub refresh_token: String,
    #[serde(default)]
    pub token: Option<String>,
    /// RFC 3339, as written by the Google client libraries.
    #[serde(default)]
    pub expiry: Option<String>,
}

pub fn load_authorized_user(path: &Path) -> Result<AuthorizedUser> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read credentials file {}", path.display()))?;
    let creds: AuthorizedUser = serde_json::from_str(&raw)
        .with_context(|| format!("malformed credentials file {}", path.display()))?;
    Ok(creds)
}
