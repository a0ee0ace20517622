//! Picks the best textual representation out of a message's payload tree.
//!
//! Priority order: a decodable `text/plain` part, then `text/html` run
//! through the HTML converter, then inline body data, then the provider
//! snippet. Parts with malformed data are skipped, not fatal. Whatever
//! survives still has to pass the remnant filter or the body is empty.

use base64::{Engine as _, engine::general_purpose};
use log::warn;

use crate::error::{Error, Result};
use crate::gmail::types::{MessageDetail, MessagePart};
use crate::text;

pub fn extract_body(detail: &MessageDetail) -> String {
    let candidate = extract_candidate(detail);
    if text::is_meaningless(&candidate) {
        String::new()
    } else {
        candidate
    }
}

fn extract_candidate(detail: &MessageDetail) -> String {
    let Some(payload) = detail.payload.as_ref() else {
        return text::normalize(&detail.snippet);
    };

    if !payload.parts.is_empty() {
        // Plain text wins over HTML no matter where it sits in the list.
        for part in &payload.parts {
            if part.mime_type.starts_with("image/") {
                continue;
            }
            if part.mime_type != "text/plain" {
                continue;
            }
            match decode_part(part) {
                Some(Ok(plain)) => return text::normalize(&plain),
                Some(Err(err)) => {
                    warn!("message {}: {err}; trying next part", detail.id);
                }
                None => {}
            }
        }

        for part in &payload.parts {
            if part.mime_type.starts_with("image/") {
                continue;
            }
            if part.mime_type != "text/html" {
                continue;
            }
            match decode_part(part) {
                Some(Ok(html)) => return text::normalize(&text::html_to_text(&html)),
                Some(Err(err)) => {
                    warn!("message {}: {err}; trying next part", detail.id);
                }
                None => {}
            }
        }
    } else if let Some(data) = payload.body.as_ref().and_then(|b| b.data.as_deref()) {
        if !data.is_empty() {
            match decode_data(data) {
                Ok(inline) => return text::normalize(&inline),
                Err(err) => warn!("message {}: {err}; falling back to snippet", detail.id),
            }
        }
    }

    text::normalize(&detail.snippet)
}

/// None when the part carries no data at all; Some(Err) when it does but
/// the data is unusable.
fn decode_part(part: &MessagePart) -> Option<Result<String>> {
    let data = part.body.as_ref()?.data.as_deref()?;
    if data.is_empty() {
        return None;
    }
    Some(decode_data(data))
}

fn decode_data(data: &str) -> Result<String> {
    // Gmail pads its base64url; tolerate unpadded data anyway.
    let bytes = general_purpose::URL_SAFE
        .decode(data)
        .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(data))
        .map_err(|err| Error::Decode(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| Error::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::types::PartBody;

    fn b64(s: &str) -> String {
        general_purpose::URL_SAFE.encode(s)
    }

    fn part(mime: &str, data: Option<&str>) -> MessagePart {
        MessagePart {
            mime_type: mime.to_string(),
            body: data.map(|d| PartBody {
                size: d.len() as i64,
                data: Some(b64(d)),
            }),
            ..Default::default()
        }
    }

    fn detail_with_parts(parts: Vec<MessagePart>, snippet: &str) -> MessageDetail {
        MessageDetail {
            id: "m1".to_string(),
            snippet: snippet.to_string(),
            payload: Some(MessagePart {
                mime_type: "multipart/mixed".to_string(),
                parts,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn no_payload_normalizes_snippet() {
        let detail = MessageDetail {
            id: "m1".to_string(),
            snippet: "just  the   snippet".to_string(),
            payload: None,
        };
        assert_eq!(extract_body(&detail), "just the snippet");
    }

    #[test]
    fn plain_text_preferred_over_html_regardless_of_order() {
        let detail = detail_with_parts(
            vec![
                part("text/html", Some("<p>HTML version</p>")),
                part("text/plain", Some("plain version")),
            ],
            "snippet",
        );
        assert_eq!(extract_body(&detail), "plain version");
    }

    #[test]
    fn html_converted_when_no_plain_part() {
        let detail = detail_with_parts(
            vec![part("text/html", Some("<p>Hi <b>there</b> friend</p>"))],
            "snippet",
        );
        assert_eq!(extract_body(&detail), "Hi there friend");
    }

    #[test]
    fn image_parts_skipped_even_when_only_ones_with_data() {
        let detail = detail_with_parts(
            vec![part("image/png", Some("not really a png"))],
            "fell back to snippet",
        );
        assert_eq!(extract_body(&detail), "fell back to snippet");
    }

    #[test]
    fn malformed_plain_part_falls_through_to_html() {
        let mut broken = part("text/plain", None);
        broken.body = Some(PartBody {
            size: 4,
            data: Some("!!!not base64!!!".to_string()),
        });
        let detail = detail_with_parts(
            vec![broken, part("text/html", Some("<p>working fallback</p>"))],
            "snippet",
        );
        assert_eq!(extract_body(&detail), "working fallback");
    }

    #[test]
    fn every_candidate_failing_falls_back_to_snippet() {
        let mut broken = part("text/plain", None);
        broken.body = Some(PartBody {
            size: 4,
            data: Some("%%%".to_string()),
        });
        let detail = detail_with_parts(vec![broken], "the snippet survives");
        assert_eq!(extract_body(&detail), "the snippet survives");
    }

    #[test]
    fn inline_body_used_when_no_parts() {
        let detail = MessageDetail {
            id: "m1".to_string(),
            snippet: "snippet".to_string(),
            payload: Some(MessagePart {
                mime_type: "text/plain".to_string(),
                body: Some(PartBody {
                    size: 11,
                    data: Some(b64("inline body")),
                }),
                ..Default::default()
            }),
        };
        assert_eq!(extract_body(&detail), "inline body");
    }

    #[test]
    fn meaningless_candidate_becomes_empty() {
        let detail = MessageDetail {
            id: "m1".to_string(),
            snippet: "<div></div>".to_string(),
            payload: None,
        };
        assert_eq!(extract_body(&detail), "");
    }

    #[test]
    fn part_without_data_is_not_an_error() {
        let detail = detail_with_parts(
            vec![part("text/plain", None), part("text/html", Some("<p>real one here</p>"))],
            "snippet",
        );
        assert_eq!(extract_body(&detail), "real one here");
    }
}
