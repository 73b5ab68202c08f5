/// Weighted image selection
///
/// This module turns a directory tree plus the current ratings into a single
/// randomly chosen image:
/// - Enumerating eligible files (candidates.rs)
/// - Rating-to-weight mapping and normalization (weights.rs)

pub mod candidates;
pub mod weights;

use log::debug;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DressageError, Result};
use crate::state::data::{RatingMap, Selection};

/// Extensions shown by default (compared case-insensitively)
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["gif", "png", "jpg", "jpeg", "jpe", "bmp"];

/// Files larger than this are never shown by default
pub const DEFAULT_MAX_BYTE_SIZE: u64 = 1_000_000;

/// Knobs for a single selection
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SelectOptions {
    /// Allowed extensions, with or without the leading dot
    pub file_extensions: Vec<String>,
    /// Inclusive upper bound on file size in bytes
    pub max_byte_size: u64,
    /// Draw only from unrated files while any remain
    pub only_unrated: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            file_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_byte_size: DEFAULT_MAX_BYTE_SIZE,
            only_unrated: false,
        }
    }
}

impl SelectOptions {
    /// Extensions lowercased and stripped of a leading dot
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.file_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect()
    }
}

/// A candidate file with its share of the probability mass
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedCandidate {
    pub path: String,
    pub weight: f64,
    pub probability: f64,
}

/// Enumerate the candidates under `source_root` and compute the probability
/// of drawing each one, without drawing.
///
/// Fails with `EmptyCandidateSet` when nothing is eligible and with
/// `DegenerateWeight` when everything eligible is rated 1.
pub fn weight_distribution(
    source_root: &Path,
    ratings: &RatingMap,
    options: &SelectOptions,
) -> Result<Vec<WeightedCandidate>> {
    let mut candidates = candidates::enumerate(source_root, options)?;
    if candidates.is_empty() {
        return Err(DressageError::EmptyCandidateSet {
            root: source_root.to_path_buf(),
        });
    }

    if options.only_unrated {
        let unrated: Vec<String> = candidates
            .iter()
            .filter(|path| !ratings.contains_key(path.as_str()))
            .cloned()
            .collect();

        if unrated.is_empty() {
            debug!("🔁 Every candidate is rated, ignoring only_unrated");
        } else {
            candidates = unrated;
        }
    }

    let raw: Vec<f64> = candidates
        .iter()
        .map(|path| weights::weight(ratings.get(path).copied()))
        .collect();

    let probabilities = weights::normalize(&raw).ok_or(DressageError::DegenerateWeight {
        candidates: candidates.len(),
    })?;

    Ok(candidates
        .into_iter()
        .zip(raw)
        .zip(probabilities)
        .map(|((path, weight), probability)| WeightedCandidate { path, weight, probability })
        .collect())
}

/// Draw one image from `source_root`, biased by `ratings`.
///
/// Reads the filesystem but never modifies it, and never touches the store.
pub fn select<R: Rng + ?Sized>(
    source_root: &Path,
    ratings: &RatingMap,
    options: &SelectOptions,
    rng: &mut R,
) -> Result<Selection> {
    let mut distribution = weight_distribution(source_root, ratings, options)?;

    let index = WeightedIndex::<f64>::new(distribution.iter().map(|c| c.probability)).map_err(|_| {
        DressageError::DegenerateWeight {
            candidates: distribution.len(),
        }
    })?;
    let chosen = distribution.swap_remove(index.sample(rng));

    let rating = ratings.get(&chosen.path).map_or(0, |r| r.value());
    debug!(
        "🎲 Picked {} (rating {}, p={:.3})",
        chosen.path, rating, chosen.probability
    );

    Ok(Selection {
        path: chosen.path,
        rating,
    })
}
