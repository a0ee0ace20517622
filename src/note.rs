//! Renders one message as a Markdown note with YAML frontmatter and writes
//! it into the vault's Inbox. Filenames are derived from the message id, so
//! re-writing the same message lands on the same file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{Error, Result};
use crate::priority::Priority;

/// Colons would break the frontmatter's `key: value` lines.
fn frontmatter_value(raw: &str) -> String {
    raw.replace(':', ";").trim().to_string()
}

pub fn note_filename(id: &str) -> String {
    format!("EMAIL_{id}.md")
}

pub fn render_note(
    from: &str,
    subject: &str,
    body: &str,
    priority: Priority,
    received: DateTime<Local>,
) -> String {
    format!(
        "---\n\
         type: email\n\
         from: {from}\n\
         subject: {subject}\n\
         received: {received}\n\
         priority: {priority}\n\
         status: pending\n\
         ---\n\
         \n\
         ## Email Content\n\
         {body}\n\
         \n\
         ## Suggested Actions\n\
         - [ ] Review content and determine appropriate response\n\
         - [ ] Take necessary action based on email content\n\
         - [ ] Archive or mark as read after processing\n",
        from = frontmatter_value(from),
        subject = frontmatter_value(subject),
        received = received.to_rfc3339(),
        priority = priority,
        body = body,
    )
}

/// Write (or overwrite) the note for `id` under the Inbox directory.
pub fn write_note(
    inbox: &Path,
    id: &str,
    from: &str,
    subject: &str,
    body: &str,
    priority: Priority,
    received: DateTime<Local>,
) -> Result<PathBuf> {
    let path = inbox.join(note_filename(id));
    let content = render_note(from, subject, body, priority, received);
    fs::write(&path, content)
        .map_err(|err| Error::Persistence(format!("note {}", path.display()), err))?;
    Ok(path)
}
