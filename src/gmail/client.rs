use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::auth::token_manager::TokenManager;
use crate::error::{Error, Result};
use crate::gmail::types::{MessageDetail, MessageList, MessageSummary};
use crate::watcher::MailSource;

const BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// A hung fetch must not stall the poll loop forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GmailClient {
    http: Client,
    tokens: TokenManager,
}

impl GmailClient {
    pub fn new(tokens: TokenManager) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, tokens })
    }

    fn bearer(&mut self) -> Result<String> {
        self.tokens
            .get_access_token()
            .map_err(|err| Error::Transport(format!("cannot get access token: {err}")))
    }
}

impl MailSource for GmailClient {
    fn list_unread(&mut self) -> Result<Vec<MessageSummary>> {
        let token = self.bearer()?;
        let list: MessageList = self
            .http
            .get(format!("{BASE_URL}/messages"))
            .query(&[("q", "is:unread")])
            .bearer_auth(&token)
            .send()?
            .error_for_status()?
            .json()?;

        debug!("provider lists {} unread messages", list.messages.len());
        Ok(list.messages)
    }

    fn get_message(&mut self, id: &str) -> Result<MessageDetail> {
        let token = self.bearer()?;
        let resp = self
            .http
            .get(format!("{BASE_URL}/messages/{id}"))
            .query(&[("format", "full")])
            .bearer_auth(&token)
            .send()?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(id.to_string()));
        }

        let detail = resp.error_for_status()?.json()?;
        Ok(detail)
    }
}
