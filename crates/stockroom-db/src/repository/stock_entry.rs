//! # Stock Entry Repository
//!
//! Stock entry invoices record goods received. Updates and deletes go
//! through [`EntityRepository`](super::entity::EntityRepository).

use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{json_column_text, NewStockEntry, StockEntryRow};

use crate::error::DbResult;

const STOCK_ENTRY_SELECT: &str = "SELECT id, \
     strftime('%Y-%m-%d, %H:%M:%S', nowDate) AS now_date, \
     items, invStatus AS inv_status, sku, remark \
     FROM stockentinvs";

/// Repository for stock entry invoices.
#[derive(Debug, Clone)]
pub struct StockEntryRepository {
    pool: SqlitePool,
}

impl StockEntryRepository {
    /// Creates a new StockEntryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockEntryRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<StockEntryRow>> {
        let sql = format!("{STOCK_ENTRY_SELECT} ORDER BY id");
        let entries = sqlx::query_as::<_, StockEntryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = entries.len(), "Listed stock entries");
        Ok(entries)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<StockEntryRow>> {
        let sql = format!("{STOCK_ENTRY_SELECT} WHERE id = ?");
        let entry = sqlx::query_as::<_, StockEntryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    /// Inserts a stock entry and returns its id.
    pub async fn insert(&self, entry: &NewStockEntry) -> DbResult<i64> {
        debug!(status = %entry.inv_status, "Inserting stock entry");

        let result = sqlx::query(
            "INSERT INTO stockentinvs (items, invStatus, sku, remark) VALUES (COALESCE(?, '[]'), ?, ?, ?)",
        )
        .bind(json_column_text(&entry.items))
        .bind(&entry.inv_status)
        .bind(&entry.sku)
        .bind(&entry.remark)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
