//! # POS Invoice Repository
//!
//! Database operations for point-of-sale invoices.
//!
//! Invoices join to `customers` (required) and to `deliveries` / `workers`
//! (optional, LEFT JOIN). `items`, `orders` and `itemIds` are JSON text.

use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::predicate::invoice_search;
use stockroom_core::{json_column_text, InvoiceFilter, InvoiceRow, NewInvoice};

use super::bind_query_as;
use crate::error::DbResult;

const INVOICE_SELECT: &str = "SELECT posinvoices.id, \
     strftime('%Y-%m-%d, %H:%M:%S', posinvoices.newDate) AS new_date, \
     posinvoices.items, \
     customers.name AS customer_name, \
     deliveries.name AS delivery_name, \
     workers.name AS worker_name, \
     posinvoices.total, \
     posinvoices.discount, \
     posinvoices.netTotal AS net_total, \
     posinvoices.note, \
     posinvoices.invStatus AS inv_status, \
     posinvoices.totalQuantity AS total_quantity, \
     posinvoices.customerId AS customer_id, \
     posinvoices.delFee AS del_fee, \
     posinvoices.deliveryId AS delivery_id, \
     posinvoices.workerId AS worker_id, \
     posinvoices.orders, \
     posinvoices.priceLevel AS price_level, \
     posinvoices.computerName AS computer_name, \
     posinvoices.itemIds AS item_ids \
     FROM posinvoices \
     JOIN customers ON customers.id = posinvoices.customerId \
     LEFT JOIN deliveries ON deliveries.id = posinvoices.deliveryId \
     LEFT JOIN workers ON workers.id = posinvoices.workerId";

/// Repository for POS invoice operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Lists every invoice, newest first.
    pub async fn list(&self) -> DbResult<Vec<InvoiceRow>> {
        let sql = format!("{INVOICE_SELECT} ORDER BY posinvoices.newDate DESC, posinvoices.id DESC");
        let invoices = sqlx::query_as::<_, InvoiceRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = invoices.len(), "Listed invoices");
        Ok(invoices)
    }

    /// Runs a normalized `/posinvoicesFilter` search.
    ///
    /// ## Returns
    /// Matching invoices ordered by date then id, both descending, at most
    /// `filter.limit` of them.
    pub async fn search(&self, filter: &InvoiceFilter) -> DbResult<Vec<InvoiceRow>> {
        let query = invoice_search(INVOICE_SELECT, filter);

        debug!(
            start = %filter.start_date,
            end = %filter.end_date,
            status = filter.status.as_str(),
            item_ids = filter.item_ids.len(),
            limit = filter.limit,
            "Searching invoices"
        );

        let invoices = bind_query_as::<InvoiceRow>(query.sql(), query.params())
            .fetch_all(&self.pool)
            .await?;

        debug!(count = invoices.len(), "Invoice search returned rows");
        Ok(invoices)
    }

    /// Gets an invoice by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<InvoiceRow>> {
        let sql = format!("{INVOICE_SELECT} WHERE posinvoices.id = ?");
        let invoice = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// Inserts an invoice and returns its id.
    pub async fn insert(&self, invoice: &NewInvoice) -> DbResult<i64> {
        debug!(customer_id = invoice.customer_id, "Inserting invoice");

        let result = sqlx::query(
            r#"
            INSERT INTO posinvoices (
                newDate, items, customerId, delFee, deliveryId, workerId, orders,
                total, discount, netTotal, invStatus, totalQuantity, note,
                priceLevel, computerName, itemIds
            )
            VALUES (
                COALESCE(?, datetime('now', 'localtime')), COALESCE(?, '[]'),
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
            )
            "#,
        )
        .bind(&invoice.new_date)
        .bind(json_column_text(&invoice.items))
        .bind(invoice.customer_id)
        .bind(invoice.del_fee)
        .bind(invoice.delivery_id)
        .bind(invoice.worker_id)
        .bind(json_column_text(&invoice.orders))
        .bind(invoice.total)
        .bind(invoice.discount)
        .bind(invoice.net_total)
        .bind(&invoice.inv_status)
        .bind(invoice.total_quantity)
        .bind(&invoice.note)
        .bind(&invoice.price_level)
        .bind(&invoice.computer_name)
        .bind(json_column_text(&invoice.item_ids))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::repository::test_support::seeded_db;
    use crate::Database;

    async fn add_invoice(db: &Database, body: serde_json::Value) -> i64 {
        let invoice: NewInvoice = serde_json::from_value(body).unwrap();
        db.invoices().insert(&invoice).await.unwrap()
    }

    async fn search(db: &Database, pairs: &[(&str, &str)]) -> Vec<i64> {
        let mut params: HashMap<String, String> = [
            ("search", ""),
            ("checkIcon", "fa-solid fa-circle-check"),
            ("startDate", "2024-03-01"),
            ("endDate", "2024-03-31"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        params.extend(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let filter = InvoiceFilter::from_params(&params).unwrap().value;
        db.invoices()
            .search(&filter)
            .await
            .unwrap()
            .iter()
            .map(|row| row.id)
            .collect()
    }

    async fn fixture() -> Database {
        let db = seeded_db().await;
        add_invoice(&db, json!({
            "newDate": "2024-03-02 10:00:00", "items": [], "customerId": 1,
            "deliveryId": 1, "workerId": 1, "invStatus": "Paid",
            "priceLevel": "Retail", "itemIds": ["12", "40"], "note": "first"
        }))
        .await;
        add_invoice(&db, json!({
            "newDate": "2024-03-05 09:30:00", "items": [], "customerId": 2,
            "deliveryId": 2, "invStatus": "Paid",
            "priceLevel": "Wholesale", "itemIds": ["7"]
        }))
        .await;
        add_invoice(&db, json!({
            "newDate": "2024-03-05 18:00:00", "items": [], "customerId": 2,
            "deliveryId": 2, "invStatus": "Canceled", "itemIds": ["12"]
        }))
        .await;
        add_invoice(&db, json!({
            "newDate": "2024-04-01 08:00:00", "items": [], "customerId": 1,
            "invStatus": "Paid", "itemIds": []
        }))
        .await;
        db
    }

    #[tokio::test]
    async fn test_date_range_and_status() {
        let db = fixture().await;

        assert_eq!(search(&db, &[]).await, vec![2, 1]);
        assert_eq!(search(&db, &[("checkIcon", "fa-solid fa-ban")]).await, vec![3]);
        assert_eq!(search(&db, &[("endDate", "2024-04-01")]).await, vec![4, 2, 1]);
    }

    #[tokio::test]
    async fn test_delivery_selector() {
        let db = fixture().await;

        assert_eq!(search(&db, &[("deliverySelectVal", "Delivery")]).await, vec![2]);
        assert_eq!(search(&db, &[("deliverySelectVal", "Both")]).await, vec![2, 1]);
        assert_eq!(search(&db, &[("deliverySelectVal", "No Del")]).await, vec![1]);
    }

    #[tokio::test]
    async fn test_item_id_membership() {
        let db = fixture().await;

        assert_eq!(
            search(&db, &[("search", "12"), ("checkIcon", "x"), ("searchVal", "zzz")]).await,
            vec![3]
        );
        assert_eq!(search(&db, &[("search", "40"), ("searchVal", "zzz")]).await, vec![1]);
        // Free text still applies once the group is active
        assert_eq!(search(&db, &[("search", "99"), ("searchVal", "omar")]).await, vec![2]);
    }

    #[tokio::test]
    async fn test_name_and_price_filters() {
        let db = fixture().await;

        assert_eq!(search(&db, &[("customer", "oma")]).await, vec![2]);
        assert_eq!(search(&db, &[("priceSelectVal", "Retail")]).await, vec![1]);
        assert_eq!(search(&db, &[("priceSelectVal", "All")]).await, vec![2, 1]);
        assert_eq!(search(&db, &[("worker", "Lina")]).await, vec![1]);
        assert_eq!(search(&db, &[("limit", "1")]).await, vec![2]);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = fixture().await;

        let invoice = db.invoices().get_by_id(1).await.unwrap().unwrap();
        assert_eq!(invoice.new_date, "2024-03-02, 10:00:00");
        assert_eq!(invoice.customer_name, "Walk-in");
        assert_eq!(invoice.delivery_name.as_deref(), Some("No Delivery"));
        assert_eq!(invoice.item_ids.as_deref(), Some(r#"["12","40"]"#));

        let bare = db.invoices().get_by_id(4).await.unwrap().unwrap();
        assert_eq!(bare.delivery_name, None);

        assert!(db.invoices().get_by_id(99).await.unwrap().is_none());
        assert_eq!(db.invoices().list().await.unwrap().len(), 4);
    }
}
