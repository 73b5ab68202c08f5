/// Shared data structures for the rating core
///
/// These structs represent the data model that flows between
/// the rating store, the selector and the calling application.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{DressageError, Result};

/// A star rating, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw value coming from the UI or the database
    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(DressageError::InvalidRating(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of the rating store: file_reference -> rating
pub type RatingMap = HashMap<String, Rating>;

/// The image picked for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Path relative to the source root, `/`-separated (the file_reference)
    pub path: String,
    /// Current rating, 0 if the image has never been rated
    pub rating: u8,
}

impl Selection {
    /// Resolve the file_reference back onto the source root
    pub fn absolute_path(&self, source_root: &Path) -> PathBuf {
        self.path
            .split('/')
            .fold(source_root.to_path_buf(), |acc, part| acc.join(part))
    }

    pub fn is_rated(&self) -> bool {
        self.rating != 0
    }
}
