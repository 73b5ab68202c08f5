/// The context object handed to the display application
///
/// A `Session` owns the rating store, the configuration and the random
/// source. The application calls `select_next` at startup and on every
/// timer expiry or refresh, and `record_rating` when the user clicks a star.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::error::Result;
use crate::select;
use crate::state::data::Selection;
use crate::state::ratings::{RatingStore, UpsertOutcome};

pub struct Session<R: Rng = StdRng> {
    store: RatingStore,
    config: Config,
    rng: R,
}

impl Session<StdRng> {
    /// Open the configured database and seed the generator from the OS
    pub fn open(config: Config) -> Result<Self> {
        let store = RatingStore::open(&config.database_path, &config.table)?;
        let image_count = store.len()?;
        info!(
            "🐎 Session ready: {} rated images, drawing from {}",
            image_count,
            config.source_root.display()
        );
        Ok(Self::with_rng(store, config, StdRng::from_entropy()))
    }
}

impl<R: Rng> Session<R> {
    /// Build a session from parts; tests pass a seeded generator here
    pub fn with_rng(store: RatingStore, config: Config, rng: R) -> Self {
        Session { store, config, rng }
    }

    /// Pick the next image to display
    pub fn select_next(&mut self) -> Result<Selection> {
        let ratings = self.store.read_all()?;
        select::select(&self.config.source_root, &ratings, &self.config.select, &mut self.rng)
    }

    /// Store the user's rating for an image previously returned by `select_next`
    pub fn record_rating(&self, path: &str, rating: u8) -> Result<UpsertOutcome> {
        info!("⭐ Recording {} stars for {}", rating, path);
        self.store.upsert(path, rating)
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Flip the only-unrated mode, e.g. from a toolbar toggle
    pub fn set_only_unrated(&mut self, only_unrated: bool) {
        self.config.select.only_unrated = only_unrated;
    }
}

/// Run a selection on tokio's blocking pool so a UI loop isn't stalled by
/// the directory walk.
///
/// `rusqlite::Connection` is not `Sync`, so the worker opens its own
/// connection from the configured path instead of borrowing a session.
pub async fn select_next_async(config: Config) -> Result<Selection> {
    tokio::task::spawn_blocking(move || {
        let store = RatingStore::open(&config.database_path, &config.table)?;
        let ratings = store.read_all()?;
        select::select(
            &config.source_root,
            &ratings,
            &config.select,
            &mut rand::thread_rng(),
        )
    })
    .await?
}
