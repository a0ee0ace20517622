//! Serde views of the Gmail REST shapes the watcher consumes:
//! `messages.list` and `messages.get?format=full`.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MessageSummary {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    /// Absent entirely when there is nothing unread.
    #[serde(default)]
    pub messages: Vec<MessageSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetail {
    pub id: String,
    #[serde(default)]
    pub snippet: String,
    pub payload: Option<MessagePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    #[serde(default)]
    pub size: i64,
    /// base64url-encoded bytes; absent for attachment stubs.
    pub data: Option<String>,
}

impl MessageDetail {
    /// Header lookup; duplicate names collapse to the last occurrence.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .next_back()
            .map(|h| h.value.as_str())
    }
}
