//! Rating-weighted image selection.
//!
//! Images under a source directory are drawn at random, weighted by the
//! 1–5 star ratings stored in SQLite: a "1" hides an image, unrated images
//! sit between a "3" and a "4", and every extra star doubles the odds.

pub mod config;
pub mod error;
pub mod select;
pub mod session;
pub mod state;

pub use config::Config;
pub use error::{DressageError, Result};
pub use select::{select, weight_distribution, SelectOptions, WeightedCandidate};
pub use session::{select_next_async, Session};
pub use state::data::{Rating, RatingMap, Selection};
pub use state::ratings::{RatingStore, UpsertOutcome};
