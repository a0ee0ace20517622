use thiserror::Error;

/// Failure classes of the watcher pipeline. Nothing here is fatal to the
/// process: the poll loop logs and keeps running through all of them.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or provider failure, scoped to the current poll cycle.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The message vanished between the listing and the fetch.
    #[error("message {0} no longer exists")]
    NotFound(String),

    /// A body part carried malformed data; the candidate is unusable.
    #[error("cannot decode message body part: {0}")]
    Decode(String),

    /// Seen-set or note write failure; the in-memory state stays
    /// authoritative until the next successful write.
    #[error("cannot persist {0}")]
    Persistence(String, #[source] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
