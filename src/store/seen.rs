//! Persisted set of already-processed message ids.
//!
//! Newline-delimited sorted text, loaded once at startup, rewritten in
//! full after every successful note write. Ids only ever get added.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::error;

use crate::error::{Error, Result};

pub struct SeenStore {
    path: PathBuf,
    ids: BTreeSet<String>,
}

impl SeenStore {
    /// Load the backing file. A missing file is a fresh start; an
    /// unreadable one is logged and treated as empty rather than blocking
    /// the watcher.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = match fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeSet::new(),
            Err(err) => {
                error!("cannot load processed ids from {}: {err}", path.display());
                BTreeSet::new()
            }
        };
        Self { path, ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add an id and rewrite the backing file in full. On write failure the
    /// in-memory set stays authoritative; the caller decides how loudly to
    /// complain.
    pub fn insert(&mut self, id: &str) -> Result<()> {
        self.ids.insert(id.to_string());
        self.save()
    }

    /// Serialize ids sorted lexicographically, one per line.
    pub fn save(&self) -> Result<()> {
        let content = self.ids.iter().cloned().collect::<Vec<_>>().join("\n");
        fs::write(&self.path, content).map_err(|err| {
            Error::Persistence(format!("processed ids file {}", self.path.display()), err)
        })
    }
}
