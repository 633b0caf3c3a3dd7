//! # Reference Table Repository
//!
//! Brand, model, category and quality lookups. Items reference these by id.

use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::sql::contains_pattern;
use stockroom_core::{CategoryRow, Entity, NamedRow};

use crate::error::DbResult;

/// The four lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTable {
    Brand,
    Model,
    Category,
    Quality,
}

impl ReferenceTable {
    pub fn entity(&self) -> Entity {
        match self {
            ReferenceTable::Brand => Entity::Brand,
            ReferenceTable::Model => Entity::Model,
            ReferenceTable::Category => Entity::Category,
            ReferenceTable::Quality => Entity::Quality,
        }
    }

    pub fn table(&self) -> &'static str {
        self.entity().table()
    }
}

/// Repository for the lookup tables.
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: SqlitePool,
}

impl ReferenceRepository {
    /// Creates a new ReferenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReferenceRepository { pool }
    }

    /// Lists every row of a name-only table (brand, model, quality).
    ///
    /// Categories carry an extra column; use [`list_categories`](Self::list_categories).
    pub async fn list(&self, table: ReferenceTable) -> DbResult<Vec<NamedRow>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY id", table.table());
        let rows = sqlx::query_as::<_, NamedRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(table = table.table(), count = rows.len(), "Listed reference rows");
        Ok(rows)
    }

    pub async fn list_categories(&self) -> DbResult<Vec<CategoryRow>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, circle_ball FROM category ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Searches models by name substring, newest first.
    pub async fn search_models(&self, search: &str, limit: u32) -> DbResult<Vec<NamedRow>> {
        debug!(search = %search, limit = limit, "Searching models");

        let rows = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name FROM model WHERE name LIKE ? ORDER BY id DESC LIMIT ?",
        )
        .bind(contains_pattern(search))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a row and returns its id.
    pub async fn insert(&self, table: ReferenceTable, name: &str) -> DbResult<i64> {
        debug!(table = table.table(), name = %name, "Inserting reference row");

        let sql = format!("INSERT INTO {} (name) VALUES (?)", table.table());
        let result = sqlx::query(&sql).bind(name).execute(&self.pool).await?;

        Ok(result.last_insert_rowid())
    }
}
