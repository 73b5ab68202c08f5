/// Error types for the selection and rating core
///
/// Every failure is reported synchronously from the call that hit it.
/// The only self-healing in the crate is the bounded upsert ladder in
/// `state::ratings`; anything that escapes it lands here as `Persistence`.

use std::path::PathBuf;

/// All errors produced by this crate
#[derive(Debug, thiserror::Error)]
pub enum DressageError {
    /// The rating store could not read or record a rating
    #[error("rating store failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// No file under the source root passed the extension and size filters
    #[error("no eligible images found under {}", root.display())]
    EmptyCandidateSet { root: PathBuf },

    /// Candidates exist but every one of them has weight 0 (all rated 1)
    #[error("all {candidates} candidate images have zero weight")]
    DegenerateWeight { candidates: usize },

    /// Unreadable directory, permission denied, missing root, ...
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rating {0} is outside the range 1..=5")]
    InvalidRating(i64),

    #[error("file reference must not be empty")]
    EmptyFileReference,

    /// Table names are spliced into SQL, so only plain identifiers are allowed
    #[error("invalid rating table name: {0:?}")]
    InvalidTableName(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The blocking worker behind `select_next_async` panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<walkdir::Error> for DressageError {
    fn from(err: walkdir::Error) -> Self {
        DressageError::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, DressageError>;
