//! # Item Repository
//!
//! Database operations for inventory items.
//!
//! ## Key Operations
//! - Filtered search (`/itemsFilter`)
//! - Lookup with reference ids (`/items/:id`)
//! - Insert
//! - Display-order rewrite, all-or-nothing
//!
//! ## Reorder
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orderedItems: [9, 4, 12]                                               │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE items SET display_order = 0 WHERE id = 9    (1 row)           │
//! │    UPDATE items SET display_order = 1 WHERE id = 4    (1 row)           │
//! │    UPDATE items SET display_order = 2 WHERE id = 12   (0 rows!)         │
//! │  ROLLBACK  → DbError::NotFound { item, 12 }, no row changed             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::predicate::item_search;
use stockroom_core::{compile_reorder, ItemDetail, ItemFilter, ItemRow, NewItem};

use super::{bind_query, bind_query_as};
use crate::error::{DbError, DbResult};

/// Columns and joins shared by `/items` and `/itemsFilter`.
const ITEM_SELECT: &str = "SELECT i.id, b.name AS brand_name, m.name AS model_name, \
     c.name AS category_name, q.name AS quality_name, i.quantity, \
     i.buyPrice AS buy_price, i.priceOne AS price_one, i.display_order, \
     i.changingId AS changing_id, i.SKU AS sku, i.boxId AS box_id, i.disable, \
     i.noExcel AS no_excel, i.discription, c.circle_ball AS ball \
     FROM items i \
     JOIN brand b ON i.brand = b.id \
     JOIN model m ON i.model = m.id \
     JOIN category c ON i.category = c.id \
     JOIN quality q ON i.quality = q.id";

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists every item by display order.
    pub async fn list(&self) -> DbResult<Vec<ItemRow>> {
        let sql = format!("{ITEM_SELECT} ORDER BY i.display_order");
        let items = sqlx::query_as::<_, ItemRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Listed items");
        Ok(items)
    }

    /// Runs a normalized `/itemsFilter` search.
    ///
    /// ## Arguments
    /// * `filter` - search terms, optional brand/category, limit
    ///
    /// ## Returns
    /// Rows where every term matches at least one of brand, model,
    /// quality, category, SKU, box id or description, ordered by
    /// display order, at most `filter.limit` of them.
    pub async fn search(&self, filter: &ItemFilter) -> DbResult<Vec<ItemRow>> {
        let query = item_search(ITEM_SELECT, filter);

        debug!(
            terms = filter.search_terms.len(),
            brand = ?filter.brand,
            category = ?filter.category,
            limit = filter.limit,
            "Searching items"
        );

        let items = bind_query_as::<ItemRow>(query.sql(), query.params())
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Item search returned rows");
        Ok(items)
    }

    /// Gets an item with its reference ids.
    ///
    /// ## Returns
    /// * `Ok(Some(ItemDetail))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<ItemDetail>> {
        let item = sqlx::query_as::<_, ItemDetail>(
            r#"
            SELECT
                i.id,
                b.name AS brand_name, b.id AS brand_id,
                m.name AS model_name, m.id AS model_id,
                c.name AS category_name, c.id AS category_id,
                q.name AS quality_name, q.id AS quality_id,
                i.quantity,
                i.buyPrice AS buy_price,
                i.priceOne AS price_one,
                i.disable,
                i.noExcel AS no_excel,
                i.discription,
                i.SKU AS sku,
                i.boxId AS box_id
            FROM items i
            JOIN brand b ON i.brand = b.id
            JOIN model m ON i.model = m.id
            JOIN category c ON i.category = c.id
            JOIN quality q ON i.quality = q.id
            WHERE i.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts an item and returns its id.
    ///
    /// Without an explicit `display_order` the item goes to the end of the
    /// list.
    pub async fn insert(&self, item: &NewItem) -> DbResult<i64> {
        debug!(sku = %item.sku, "Inserting item");

        let result = sqlx::query(
            r#"
            INSERT INTO items (
                id, SKU, boxId, disable, noExcel, brand, model, category, quality,
                quantity, buyPrice, priceOne, display_order, changingId, discription
            )
            VALUES (
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                COALESCE(?, (SELECT COALESCE(MAX(display_order) + 1, 0) FROM items)),
                ?, ?
            )
            "#,
        )
        .bind(item.id)
        .bind(&item.sku)
        .bind(&item.box_id)
        .bind(item.disable)
        .bind(item.no_excel)
        .bind(item.brand)
        .bind(item.model)
        .bind(item.category)
        .bind(item.quality)
        .bind(item.quantity)
        .bind(item.buy_price)
        .bind(item.price_one)
        .bind(item.display_order)
        .bind(&item.changing_id)
        .bind(&item.discription)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Sets `display_order` to each id's position in `ordered_ids`.
    ///
    /// Runs in one transaction. If any id matches no row, nothing is
    /// changed and [`DbError::NotFound`] names the first missing id.
    pub async fn reorder(&self, ordered_ids: &[i64]) -> DbResult<()> {
        debug!(count = ordered_ids.len(), "Reordering items");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| match DbError::from(e) {
                unavailable if unavailable.is_unavailable() => unavailable,
                other => DbError::TransactionFailed(other.to_string()),
            })?;

        for (statement, id) in compile_reorder(ordered_ids).iter().zip(ordered_ids) {
            let result = bind_query(statement.sql(), statement.params())
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls it back.
                return Err(DbError::not_found("item", id));
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::repository::test_support::{insert_item, seeded_db};
    use stockroom_core::filter::BRAND_SENTINEL;

    fn filter(pairs: &[(&str, &str)]) -> ItemFilter {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ItemFilter::from_params(&params).value
    }

    #[tokio::test]
    async fn test_search_matches_sku_case_insensitively() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 0).await;
        insert_item(&db, 2, "B2", 2, 1).await;

        let rows = db.items().search(&filter(&[("search", "a1")])).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].brand_name, "X");
    }

    #[tokio::test]
    async fn test_multi_term_search_is_conjunctive() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 0).await;
        insert_item(&db, 2, "B2", 2, 1).await;

        // "glass" matches both via category, "b2" only item 2
        let rows = db
            .items()
            .search(&filter(&[("search", "Glass B2")]))
            .await
            .unwrap();

        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn test_brand_sentinel_and_limit() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 2).await;
        insert_item(&db, 2, "B2", 2, 0).await;
        insert_item(&db, 3, "C3", 1, 1).await;

        let all = db
            .items()
            .search(&filter(&[("search", ""), ("brandDivVal", BRAND_SENTINEL)]))
            .await
            .unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3, 1]);

        let brand_x = db
            .items()
            .search(&filter(&[("brandDivVal", "X"), ("limit", "1")]))
            .await
            .unwrap();
        assert_eq!(brand_x.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3]);

        let none = db.items().search(&filter(&[("limit", "0")])).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_category_plus_escape() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 0).await;
        sqlx::query("UPDATE items SET category = 2 WHERE id = 1")
            .execute(db.pool())
            .await
            .unwrap();

        let escaped = db
            .items()
            .search(&filter(&[("categoryDivVal", "Glass plus Frame")]))
            .await
            .unwrap();
        let literal = db
            .items()
            .search(&filter(&[("categoryDivVal", "Glass + Frame")]))
            .await
            .unwrap();

        assert_eq!(escaped.len(), 1);
        assert_eq!(escaped, literal);
    }

    #[tokio::test]
    async fn test_insert_and_get_by_id() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 4).await;

        let new_item: NewItem = serde_json::from_value(serde_json::json!({
            "SKU": "Z9", "brand": 2, "model": 2, "category": 1, "quality": 1,
            "priceOne": 7.5
        }))
        .unwrap();
        let id = db.items().insert(&new_item).await.unwrap();

        let detail = db.items().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(detail.sku, "Z9");
        assert_eq!(detail.brand_name, "Y");
        assert_eq!(detail.price_one, 7.5);

        let listed = db.items().list().await.unwrap();
        assert_eq!(listed.last().map(|r| (r.id, r.display_order)), Some((id, 5)));

        assert!(db.items().get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reorder_is_all_or_nothing() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 0).await;
        insert_item(&db, 2, "B2", 1, 1).await;

        db.items().reorder(&[2, 1]).await.unwrap();
        let ids: Vec<i64> = db.items().list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let err = db.items().reorder(&[1, 2, 99]).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref id, .. } if id == "99"));

        let ids: Vec<i64> = db.items().list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
