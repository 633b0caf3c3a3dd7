//! # Application State
//!
//! Shared by every handler through axum's `State` extractor.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is reference-counted and
//! thread-safe. Cloning the state per request is cheap and needs no locks.

use stockroom_db::Database;

/// State handed to every route.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    /// Creates a new AppState around an open database.
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
