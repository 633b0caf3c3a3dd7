//! # Row and Payload Types
//!
//! Shapes returned by the read endpoints and accepted by the create
//! endpoints.
//!
//! ## Naming
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rust field      SQL alias        JSON key (what the frontend reads)    │
//! │  ────────────    ─────────────    ──────────────────────────────────    │
//! │  buy_price       buy_price        buyPrice                              │
//! │  sku             sku              SKU                                   │
//! │  brand_name      brand_name       brand_name                            │
//! │                                                                         │
//! │  Repositories alias every selected column to the Rust field name so     │
//! │  FromRow needs no per-field attributes; serde restores the JSON keys.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Array-valued invoice columns (`items`, `orders`, `itemIds`) are stored
//! as JSON text and returned as text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

// =============================================================================
// Items
// =============================================================================

/// An item as listed by `/items` and `/itemsFilter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemRow {
    pub id: i64,
    pub brand_name: String,
    pub model_name: String,
    pub category_name: String,
    pub quality_name: String,
    pub quantity: i64,
    #[serde(rename = "buyPrice")]
    pub buy_price: f64,
    #[serde(rename = "priceOne")]
    pub price_one: f64,
    pub display_order: i64,
    #[serde(rename = "changingId")]
    pub changing_id: Option<String>,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "boxId")]
    pub box_id: Option<String>,
    pub disable: i64,
    #[serde(rename = "noExcel")]
    pub no_excel: i64,
    pub discription: Option<String>,
    /// Category's `circle_ball` flag.
    pub ball: Option<i64>,
}

/// An item with its reference ids, as returned by `/items/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemDetail {
    pub id: i64,
    pub brand_name: String,
    pub brand_id: i64,
    pub model_name: String,
    pub model_id: i64,
    pub category_name: String,
    pub category_id: i64,
    pub quality_name: String,
    pub quality_id: i64,
    pub quantity: i64,
    #[serde(rename = "buyPrice")]
    pub buy_price: f64,
    #[serde(rename = "priceOne")]
    pub price_one: f64,
    pub disable: i64,
    #[serde(rename = "noExcel")]
    pub no_excel: i64,
    pub discription: Option<String>,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "boxId")]
    pub box_id: Option<String>,
}

/// Body of `POST /items`.
///
/// `id` is optional: the frontend may assign one, otherwise SQLite does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "boxId", default)]
    pub box_id: Option<String>,
    #[serde(default)]
    pub disable: i64,
    #[serde(rename = "noExcel", default)]
    pub no_excel: i64,
    pub brand: i64,
    pub model: i64,
    pub category: i64,
    pub quality: i64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(rename = "buyPrice", default)]
    pub buy_price: f64,
    #[serde(rename = "priceOne", default)]
    pub price_one: f64,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(rename = "changingId", default)]
    pub changing_id: Option<String>,
    #[serde(default)]
    pub discription: Option<String>,
}

/// Body of `POST /update-order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReorderRequest {
    #[serde(rename = "orderedItems")]
    pub ordered_items: Vec<i64>,
}

// =============================================================================
// Stock Entry Invoices
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockEntryRow {
    pub id: i64,
    #[serde(rename = "nowDate")]
    pub now_date: String,
    pub items: String,
    #[serde(rename = "invStatus")]
    pub inv_status: String,
    pub sku: Option<String>,
    pub remark: Option<String>,
}

/// Body of `POST /stockentinvs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStockEntry {
    pub items: Value,
    #[serde(rename = "invStatus")]
    pub inv_status: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
}

// =============================================================================
// POS Invoices
// =============================================================================

/// A POS invoice joined with its customer, delivery and worker names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InvoiceRow {
    pub id: i64,
    #[serde(rename = "newDate")]
    pub new_date: String,
    pub items: String,
    pub customer_name: String,
    pub delivery_name: Option<String>,
    pub worker_name: Option<String>,
    pub total: f64,
    pub discount: f64,
    #[serde(rename = "netTotal")]
    pub net_total: f64,
    pub note: Option<String>,
    #[serde(rename = "invStatus")]
    pub inv_status: String,
    #[serde(rename = "totalQuantity")]
    pub total_quantity: i64,
    #[serde(rename = "customerId")]
    pub customer_id: i64,
    #[serde(rename = "delFee")]
    pub del_fee: f64,
    #[serde(rename = "deliveryId")]
    pub delivery_id: Option<i64>,
    #[serde(rename = "workerId")]
    pub worker_id: Option<i64>,
    pub orders: Option<String>,
    #[serde(rename = "priceLevel")]
    pub price_level: Option<String>,
    #[serde(rename = "computerName")]
    pub computer_name: Option<String>,
    #[serde(rename = "itemIds")]
    pub item_ids: Option<String>,
}

/// Body of `POST /posinvoices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInvoice {
    /// `YYYY-MM-DD HH:MM:SS`; defaults to the server's local time.
    #[serde(rename = "newDate", default)]
    pub new_date: Option<String>,
    pub items: Value,
    #[serde(rename = "customerId")]
    pub customer_id: i64,
    #[serde(rename = "delFee", default)]
    pub del_fee: f64,
    #[serde(rename = "deliveryId", default)]
    pub delivery_id: Option<i64>,
    #[serde(rename = "workerId", default)]
    pub worker_id: Option<i64>,
    #[serde(default)]
    pub orders: Value,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(rename = "netTotal", default)]
    pub net_total: f64,
    #[serde(rename = "invStatus")]
    pub inv_status: String,
    #[serde(rename = "totalQuantity", default)]
    pub total_quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(rename = "priceLevel", default)]
    pub price_level: Option<String>,
    #[serde(rename = "computerName", default)]
    pub computer_name: Option<String>,
    #[serde(rename = "itemIds", default)]
    pub item_ids: Value,
}

// =============================================================================
// Reference Tables
// =============================================================================

/// A `brand`, `model` or `quality` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct NamedRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub circle_ball: Option<i64>,
}

/// Body of `POST /brand`, `/model`, `/category`, `/quality`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewName {
    pub name: String,
}

// =============================================================================
// Contacts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerRow {
    pub id: i64,
    #[serde(rename = "dateTime")]
    pub date_time: String,
    pub name: String,
    #[serde(rename = "phoneNo")]
    pub phone_no: Option<String>,
    #[serde(rename = "delFee")]
    pub del_fee: f64,
    pub address: Option<String>,
    pub remark: Option<String>,
    #[serde(rename = "priceLevel")]
    pub price_level: Option<String>,
}

/// A `deliveries` or `workers` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PersonRow {
    pub id: i64,
    #[serde(rename = "dateTime")]
    pub date_time: String,
    pub name: String,
    #[serde(rename = "phoneNo")]
    pub phone_no: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    #[serde(rename = "phoneNo", default)]
    pub phone_no: Option<String>,
    #[serde(rename = "delFee", default)]
    pub del_fee: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(rename = "priceLevel", default)]
    pub price_level: Option<String>,
}

/// Body of `POST /deliveries` and `POST /workers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewContact {
    pub name: String,
    #[serde(rename = "phoneNo", default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

// =============================================================================
// Loans
// =============================================================================

/// A loan joined with its invoice date, as listed by `/loans`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LoanRow {
    pub id: i64,
    pub amount: f64,
    #[serde(rename = "invoiceNum")]
    pub invoice_num: Option<i64>,
    #[serde(rename = "posNowDate")]
    pub pos_now_date: Option<String>,
    #[serde(rename = "loanNowDate")]
    pub loan_now_date: String,
    pub note: Option<String>,
    pub customer_id: i64,
}

/// A single loan, as returned by `/oneloan/:invoiceNum`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LoanRecord {
    pub id: i64,
    pub amount: f64,
    #[serde(rename = "invoiceNum")]
    pub invoice_num: Option<i64>,
    #[serde(rename = "nowDate")]
    pub now_date: String,
    pub note: Option<String>,
    pub customer_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewLoan {
    pub amount: f64,
    #[serde(rename = "invoiceNum", default)]
    pub invoice_num: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
    pub customer_id: i64,
}

// =============================================================================
// Write Results
// =============================================================================

/// Outcome of an insert or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WriteResult {
    #[serde(rename = "insertId")]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[ts(optional)]
    pub insert_id: Option<i64>,
    #[serde(rename = "affectedRows")]
    pub affected_rows: u64,
}

impl WriteResult {
    pub fn inserted(id: i64) -> Self {
        Self {
            insert_id: Some(id),
            affected_rows: 1,
        }
    }

    pub fn affected(rows: u64) -> Self {
        Self {
            insert_id: None,
            affected_rows: rows,
        }
    }
}

/// Text stored for a JSON-valued column.
///
/// Strings are stored as-is so a client that already serialized the array
/// is not double-encoded. `null` stores NULL.
pub fn json_column_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
