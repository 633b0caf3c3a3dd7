//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.items().search(&filter)                                     │
//! │       ▼                                                                 │
//! │  ItemRepository                                                         │
//! │  ├── owns the base SELECT text                                          │
//! │  ├── asks stockroom-core for the WHERE/ORDER/LIMIT tail                 │
//! │  └── binds the SqlFragment params in order (bind_query_as)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`item::ItemRepository`] - Item listing, search, insert, reordering
//! - [`invoice::InvoiceRepository`] - POS invoice listing, search, insert
//! - [`stock_entry::StockEntryRepository`] - Stock entry invoices
//! - [`reference::ReferenceRepository`] - Brand, model, category, quality
//! - [`contact::ContactRepository`] - Customers, deliveries, workers
//! - [`loan::LoanRepository`] - Customer loans
//! - [`entity::EntityRepository`] - Update and delete by id, for every table

pub mod contact;
pub mod entity;
pub mod invoice;
pub mod item;
pub mod loan;
pub mod reference;
pub mod stock_entry;

use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::FromRow;

use stockroom_core::SqlValue;

/// Binds one value with the encoder matching its storage class.
macro_rules! bind_value {
    ($query:expr, $value:expr) => {
        match $value {
            SqlValue::Null => $query.bind(None::<i64>),
            SqlValue::Integer(i) => $query.bind(*i),
            SqlValue::Real(f) => $query.bind(*f),
            SqlValue::Text(s) => $query.bind(s.as_str()),
        }
    };
}

/// Prepares `sql` with `params` bound in placeholder order.
pub(crate) fn bind_query<'q>(
    sql: &'q str,
    params: &'q [SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, value| bind_value!(query, value))
}

/// Like [`bind_query`], mapping each row to `O`.
pub(crate) fn bind_query_as<'q, O>(
    sql: &'q str,
    params: &'q [SqlValue],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>>
where
    O: for<'r> FromRow<'r, SqliteRow>,
{
    params
        .iter()
        .fold(sqlx::query_as::<_, O>(sql), |query, value| {
            bind_value!(query, value)
        })
}
