use anyhow::{Result, anyhow};
use chrono::DateTime;
use log::debug;
use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{AuthUrl, ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::credentials::AuthorizedUser;

/// Refresh this many seconds before the provider-reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

pub struct TokenManager {
    creds: AuthorizedUser,
    access_token: Option<String>,
    expires_at_epoch: i64,
}

impl TokenManager {
    pub fn new(creds: AuthorizedUser) -> Self {
        // Seed from the token cached in the credentials file when it
        // carries a parseable expiry; otherwise the first call refreshes.
        let (access_token, expires_at_epoch) = match (&creds.token, &creds.expiry) {
            (Some(token), Some(expiry)) => match DateTime::parse_from_rfc3339(expiry) {
                Ok(exp) => (Some(token.clone()), exp.timestamp()),
                Err(_) => (None, 0),
            },
            _ => (None, 0),
        };

        Self {
            creds,
            access_token,
            expires_at_epoch,
        }
    }

    /// Returns a valid access token; refreshes when the cached one is
    /// missing or stale.
    pub fn get_access_token(&mut self) -> Result<String> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;

        if let Some(token) = &self.access_token {
            if now + EXPIRY_MARGIN_SECS < self.expires_at_epoch {
                return Ok(token.clone());
            }
        }

        debug!("access token missing or expired; refreshing");
        self.refresh(now)
    }

    fn refresh(&mut self, now: i64) -> Result<String> {
        let client_id = ClientId::new(self.creds.client_id.clone());
        let client_secret = self.creds.client_secret.clone().map(ClientSecret::new);

        let auth_url = AuthUrl::new("https://accounts.google.com/o/oauth2/v2/auth".to_string())?;
        let token_url = TokenUrl::new("https://oauth2.googleapis.com/token".to_string())?;

        let oauth_client = BasicClient::new(client_id, client_secret, auth_url, Some(token_url));

        let rt = RefreshToken::new(self.creds.refresh_token.clone());
        let token = oauth_client
            .exchange_refresh_token(&rt)
            .request(http_client)
            .map_err(|e| anyhow!("token refresh failed: {e}"))?;

        let access = token.access_token().secret().to_string();
        let expires_at = token
            .expires_in()
            .map(|d| now + d.as_secs() as i64)
            .unwrap_or(now + 3500);

        self.access_token = Some(access.clone());
        self.expires_at_epoch = expires_at;
        Ok(access)
    }
}
