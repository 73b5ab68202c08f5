use log::{debug, info, warn};
use rusqlite::{ffi, Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data::{Rating, RatingMap};
use crate::error::{DressageError, Result};

/// Default table holding the ratings
pub const DEFAULT_TABLE: &str = "ratings";

/// How long a statement waits on a locked database before failing with BUSY
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Which rung of the upsert ladder recorded the rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The atomic insert-or-update succeeded on the first try
    Upserted,
    /// The upsert hit an operational error; a plain insert succeeded
    Inserted,
    /// The plain insert hit a uniqueness violation; an update by key succeeded
    Updated,
}

/// The RatingStore manages the SQLite rating table.
/// One row per file_reference, holding a rating between 1 and 5.
pub struct RatingStore {
    conn: Connection,
    table: String,
    db_path: Option<PathBuf>,
}

impl RatingStore {
    /// Open (or create) the rating database at `db_path` and make sure
    /// `table` exists.
    pub fn open(db_path: &Path, table: &str) -> Result<Self> {
        validate_table_name(table)?;

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        info!("📁 Rating database opened at: {}", db_path.display());

        let store = RatingStore {
            conn,
            table: table.to_string(),
            db_path: Some(db_path.to_path_buf()),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Private in-memory store, mostly for tests
    pub fn open_in_memory(table: &str) -> Result<Self> {
        validate_table_name(table)?;

        let store = RatingStore {
            conn: Connection::open_in_memory()?,
            table: table.to_string(),
            db_path: None,
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Wrap an existing connection without touching its schema.
    /// Used for tables created by older tools.
    pub fn attach(conn: Connection, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        Ok(RatingStore {
            conn,
            table: table.to_string(),
            db_path: None,
        })
    }

    /// Create the rating table if it doesn't exist
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (
                    file_reference  TEXT PRIMARY KEY NOT NULL,
                    rating          INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5)
                )",
                self.table
            ),
            [],
        )?;

        debug!("✅ Rating table \"{}\" ready", self.table);

        Ok(())
    }

    /// Get the path to the database file (None for in-memory stores)
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Change how long writes wait on a locked database
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Number of rated files
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\"", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read every rating record.
    ///
    /// Rows holding a value outside 1..=5 (possible in tables written by
    /// other tools) are skipped with a warning rather than failing the read.
    pub fn read_all(&self) -> Result<RatingMap> {
        let rows = self.query_pairs(
            &format!("SELECT file_reference, rating FROM \"{}\"", self.table),
            [],
        )?;

        Ok(rows.into_iter().collect())
    }

    /// Look up the rating of a single file
    pub fn get(&self, file_reference: &str) -> Result<Option<Rating>> {
        let rows = self.query_pairs(
            &format!(
                "SELECT file_reference, rating FROM \"{}\" WHERE file_reference = ?1",
                self.table
            ),
            [file_reference],
        )?;

        Ok(rows.into_iter().next().map(|(_, rating)| rating))
    }

    /// Records rated at or below `threshold`, sorted by file_reference.
    /// This is what cleanup tools use to find images to move away.
    pub fn read_at_or_below(&self, threshold: u8) -> Result<Vec<(String, Rating)>> {
        self.query_pairs(
            &format!(
                "SELECT file_reference, rating FROM \"{}\" WHERE rating <= ?1 ORDER BY file_reference",
                self.table
            ),
            [threshold],
        )
    }

    fn query_pairs<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<(String, Rating)>> {
        let mut stmt = self.conn.prepare(sql)?;

        let row_iter = stmt.query_map(params, |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut pairs = Vec::new();
        for row in row_iter {
            let (file_reference, raw) = row?;
            match Rating::new(raw) {
                Ok(rating) => pairs.push((file_reference, rating)),
                Err(_) => warn!("⚠️  Ignoring out-of-range rating {} for {}", raw, file_reference),
            }
        }

        Ok(pairs)
    }

    /// Insert or replace the rating for `file_reference`.
    ///
    /// Three tiers, each catching only its own error class:
    /// 1. atomic `INSERT ... ON CONFLICT DO UPDATE`
    /// 2. on an operational error (busy, locked, generic SQL error), a plain `INSERT`
    /// 3. on a uniqueness violation from tier 2, an `UPDATE` by key
    ///
    /// Anything else propagates as `DressageError::Persistence`.
    pub fn upsert(&self, file_reference: &str, rating: u8) -> Result<UpsertOutcome> {
        if file_reference.is_empty() {
            return Err(DressageError::EmptyFileReference);
        }
        let rating = Rating::new(i64::from(rating))?;
        let value = rating.value();
        let params = rusqlite::params![file_reference, value];

        let upsert_err = match self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (file_reference, rating) VALUES (?1, ?2)
                 ON CONFLICT(file_reference) DO UPDATE SET rating = excluded.rating",
                self.table
            ),
            params,
        ) {
            Ok(_) => {
                debug!("⭐ Recorded {} stars for {}", rating, file_reference);
                return Ok(UpsertOutcome::Upserted);
            }
            Err(err) if is_operational(&err) => err,
            Err(err) => return Err(err.into()),
        };

        warn!(
            "⚠️  Operational error while recording rating for {}: {}",
            file_reference, upsert_err
        );

        let insert_err = match self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (file_reference, rating) VALUES (?1, ?2)",
                self.table
            ),
            params,
        ) {
            Ok(_) => {
                warn!(
                    "🔄 Recorded rating for {} with a plain insert after an operational error",
                    file_reference
                );
                return Ok(UpsertOutcome::Inserted);
            }
            Err(err) if is_uniqueness_violation(&err) => err,
            Err(err) => return Err(err.into()),
        };

        warn!(
            "⚠️  Uniqueness violation while recording rating for {}: {}",
            file_reference, insert_err
        );

        let changed = self.conn.execute(
            &format!(
                "UPDATE \"{}\" SET rating = ?2 WHERE file_reference = ?1",
                self.table
            ),
            params,
        )?;

        // The colliding row is keyed differently (e.g. a case-folded index)
        if changed == 0 {
            return Err(rusqlite::Error::StatementChangedRows(0).into());
        }

        warn!(
            "🔄 Recorded rating for {} with an update after a uniqueness violation",
            file_reference
        );

        Ok(UpsertOutcome::Updated)
    }
}

/// Errors that come from the environment rather than the data:
/// a busy or locked database, a missing table, an upsert target with no
/// matching unique constraint.
fn is_operational(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::Unknown
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SchemaChanged
        ),
        _ => false,
    }
}

/// Only a duplicate key counts; NOT NULL, CHECK and FOREIGN KEY failures don't
fn is_uniqueness_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

/// Table names are interpolated into SQL, so restrict them to identifiers
fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(DressageError::InvalidTableName(table.to_string()))
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for RatingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingStore")
            .field("db_path", &self.db_path)
            .field("table", &self.table)
            .finish()
    }
}
