/// State management module
///
/// This module handles all persistent state, including:
/// - The SQLite rating store and its upsert ladder (ratings.rs)
/// - Shared data structures (data.rs)

pub mod data;
pub mod ratings;
