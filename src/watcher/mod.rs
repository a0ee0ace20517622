//! The poll loop: list unread, convert each new message to a note, mark it
//! seen. One cycle at a time, one fixed sleep between cycles, errors logged
//! and contained so the loop can run unattended indefinitely.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use chrono::Local;
use log::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::gmail::body::extract_body;
use crate::gmail::types::{MessageDetail, MessageSummary};
use crate::note::write_note;
use crate::priority::classify;
use crate::store::seen::SeenStore;

/// The unread-mail collaborator: a listing and a per-message fetch. The
/// pipeline only ever consumes these two operations.
pub trait MailSource {
    fn list_unread(&mut self) -> Result<Vec<MessageSummary>>;
    fn get_message(&mut self, id: &str) -> Result<MessageDetail>;
}

/// A polled source that materializes new items as vault notes. The run
/// loop depends on nothing beyond this.
pub trait Watcher {
    type Item;

    /// Items that appeared since the last cycle.
    fn list_new(&mut self) -> Result<Vec<Self::Item>>;

    /// Convert one item into a note file, returning its path.
    fn materialize(&mut self, item: &Self::Item) -> Result<PathBuf>;
}

pub struct GmailWatcher<S: MailSource> {
    source: S,
    seen: SeenStore,
    inbox: PathBuf,
}

impl<S: MailSource> GmailWatcher<S> {
    pub fn new(source: S, seen: SeenStore, vault_path: &Path) -> Result<Self> {
        let inbox = vault_path.join("Inbox");
        fs::create_dir_all(&inbox)
            .map_err(|err| Error::Persistence(format!("inbox dir {}", inbox.display()), err))?;

        Ok(Self {
            source,
            seen,
            inbox,
        })
    }

    /// Seen-set write failures are non-fatal: worst case the message is
    /// converted again next cycle, landing on the same note file.
    fn mark_seen(&mut self, id: &str) {
        if let Err(err) = self.seen.insert(id) {
            warn!("{err}; {id} may be reprocessed after a restart");
        }
    }
}

impl<S: MailSource> Watcher for GmailWatcher<S> {
    type Item = MessageSummary;

    fn list_new(&mut self) -> Result<Vec<MessageSummary>> {
        let summaries = self.source.list_unread()?;
        Ok(summaries
            .into_iter()
            .filter(|s| !self.seen.contains(&s.id))
            .collect())
    }

    fn materialize(&mut self, item: &MessageSummary) -> Result<PathBuf> {
        let detail = match self.source.get_message(&item.id) {
            Ok(detail) => detail,
            Err(Error::NotFound(id)) => {
                // Vanished between list and get; nothing left to convert.
                self.mark_seen(&id);
                return Err(Error::NotFound(id));
            }
            Err(err) => return Err(err),
        };

        let from = detail.header("From").unwrap_or("Unknown").to_string();
        let subject = detail.header("Subject").unwrap_or("No Subject").to_string();
        let body = extract_body(&detail);
        let priority = classify(&subject, &from, &body);

        let path = write_note(
            &self.inbox,
            &detail.id,
            &from,
            &subject,
            &body,
            priority,
            Local::now(),
        )?;

        // Only a message whose note reached the disk counts as processed.
        self.mark_seen(&detail.id);
        Ok(path)
    }
}

/// One poll cycle. A listing failure aborts the cycle ("zero new items");
/// a failure on one item is logged and does not touch the others.
pub fn run_cycle<W: Watcher>(watcher: &mut W, running: Option<&AtomicBool>) {
    let items = match watcher.list_new() {
        Ok(items) => items,
        Err(err) => {
            error!("cannot list new items: {err}");
            return;
        }
    };

    if items.is_empty() {
        debug!("no new items this cycle");
        return;
    }
    info!("found {} new items", items.len());

    for item in &items {
        if let Some(flag) = running {
            if !flag.load(Ordering::SeqCst) {
                return;
            }
        }

        match watcher.materialize(item) {
            Ok(path) => info!("created action file {}", path.display()),
            Err(Error::NotFound(id)) => warn!("message {id} vanished before fetch; skipped"),
            Err(err) => error!("cannot materialize item: {err}"),
        }
    }
}

/// Poll until `running` goes false. Exactly one sleep per cycle, at the
/// end, however the cycle went.
pub fn run<W: Watcher>(watcher: &mut W, interval: Duration, running: &AtomicBool) {
    info!("watcher started; polling every {}s", interval.as_secs());

    while running.load(Ordering::SeqCst) {
        run_cycle(watcher, Some(running));
        thread::sleep(interval);
    }

    info!("watcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::types::{Header, MessagePart, PartBody};
    use base64::{Engine as _, engine::general_purpose};
    use std::collections::HashMap;
    use tempfile::tempdir;

    struct FakeSource {
        listing: Vec<MessageSummary>,
        details: HashMap<String, MessageDetail>,
    }

    impl MailSource for FakeSource {
        fn list_unread(&mut self) -> Result<Vec<MessageSummary>> {
            Ok(self.listing.clone())
        }

        fn get_message(&mut self, id: &str) -> Result<MessageDetail> {
            self.details
                .get(id)
                .cloned()
                .ok_or_else(|| Error::NotFound(id.to_string()))
        }
    }

    fn plain_message(id: &str, from: &str, subject: &str, body: &str) -> MessageDetail {
        MessageDetail {
            id: id.to_string(),
            snippet: String::new(),
            payload: Some(MessagePart {
                mime_type: "multipart/alternative".to_string(),
                headers: vec![
                    Header {
                        name: "From".to_string(),
                        value: from.to_string(),
                    },
                    Header {
                        name: "Subject".to_string(),
                        value: subject.to_string(),
                    },
                ],
                body: None,
                parts: vec![MessagePart {
                    mime_type: "text/plain".to_string(),
                    body: Some(PartBody {
                        size: body.len() as i64,
                        data: Some(general_purpose::URL_SAFE.encode(body)),
                    }),
                    ..Default::default()
                }],
            }),
        }
    }

    #[test]
    fn failing_message_is_retried_not_marked_seen() {
        let dir = tempdir().unwrap();
        let state = dir.path().join("processed_ids");

        // "gone" is listed but cannot be fetched as a real failure.
        struct Flaky {
            inner: FakeSource,
        }
        impl MailSource for Flaky {
            fn list_unread(&mut self) -> Result<Vec<MessageSummary>> {
                self.inner.list_unread()
            }
            fn get_message(&mut self, id: &str) -> Result<MessageDetail> {
                if id == "flaky" {
                    return Err(Error::Transport("connection reset".to_string()));
                }
                self.inner.get_message(id)
            }
        }

        let source = Flaky {
            inner: FakeSource {
                listing: vec![
                    MessageSummary {
                        id: "flaky".to_string(),
                    },
                    MessageSummary {
                        id: "ok".to_string(),
                    },
                ],
                details: HashMap::from([(
                    "ok".to_string(),
                    plain_message("ok", "a@b.c", "hello", "fine message body"),
                )]),
            },
        };

        let mut watcher =
            GmailWatcher::new(source, SeenStore::open(&state), dir.path()).unwrap();
        run_cycle(&mut watcher, None);

        // The healthy message went through; the flaky one stays eligible.
        assert!(dir.path().join("Inbox/EMAIL_ok.md").exists());
        assert!(!dir.path().join("Inbox/EMAIL_flaky.md").exists());
        let state_content = fs::read_to_string(&state).unwrap();
        assert!(state_content.contains("ok"));
        assert!(!state_content.contains("flaky"));
    }

    #[test]
    fn vanished_message_is_skipped_and_not_retried() {
        let dir = tempdir().unwrap();
        let state = dir.path().join("processed_ids");

        let source = FakeSource {
            listing: vec![MessageSummary {
                id: "ghost".to_string(),
            }],
            details: HashMap::new(),
        };

        let mut watcher =
            GmailWatcher::new(source, SeenStore::open(&state), dir.path()).unwrap();
        run_cycle(&mut watcher, None);

        assert!(!dir.path().join("Inbox/EMAIL_ghost.md").exists());
        assert_eq!(fs::read_to_string(&state).unwrap(), "ghost");
    }

    #[test]
    fn listing_failure_aborts_cycle_quietly() {
        let dir = tempdir().unwrap();

        struct Down;
        impl MailSource for Down {
            fn list_unread(&mut self) -> Result<Vec<MessageSummary>> {
                Err(Error::Transport("dns failure".to_string()))
            }
            fn get_message(&mut self, _id: &str) -> Result<MessageDetail> {
                unreachable!("cycle must not fetch after a failed listing")
            }
        }

        let mut watcher = GmailWatcher::new(
            Down,
            SeenStore::open(dir.path().join("processed_ids")),
            dir.path(),
        )
        .unwrap();
        run_cycle(&mut watcher, None);

        let entries: Vec<_> = fs::read_dir(dir.path().join("Inbox")).unwrap().collect();
        assert!(entries.is_empty());
    }
}
