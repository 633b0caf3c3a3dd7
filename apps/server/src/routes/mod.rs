//! # HTTP Routes
//!
//! One module per resource family. Each exposes `routes()`, merged into the
//! application router by [`crate::build_router`].
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items          GET /items  /itemsFilter  /items/{id}                   │
//! │                 POST /items  /update-order   PUT|DELETE /items/{id}     │
//! │  stock_entries  GET|POST /stockentinvs   GET|PUT|DELETE /{id}           │
//! │  invoices       GET|POST /posinvoices  GET /posinvoicesFilter           │
//! │                 GET|PUT|DELETE /posinvoices/{id}                        │
//! │  references     GET|POST /brand /model /category /quality               │
//! │                 PUT|DELETE /{table}/{id}                                │
//! │  contacts       GET|POST /customers /deliveries /workers                │
//! │                 GET|PUT|DELETE /{table}/{id}                            │
//! │  loans          GET|POST /loans  GET|PUT|DELETE /loans/{id}             │
//! │                 GET /oneloan/{invoiceNum}  DELETE /totalLoans/{id}      │
//! │  health         GET /health                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod contacts;
pub mod entity;
pub mod health;
pub mod invoices;
pub mod items;
pub mod loans;
pub mod references;
pub mod stock_entries;

use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use stockroom_core::CoreError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// All API routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(items::routes())
        .merge(stock_entries::routes())
        .merge(invoices::routes())
        .merge(references::routes())
        .merge(contacts::routes())
        .merge(loans::routes())
        .merge(health::routes())
}

/// Deserializes a JSON body into a typed payload, reporting shape errors as 400.
pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e)))
}

/// Logs filter inputs that were replaced by defaults.
pub(crate) fn log_filter_warnings(route: &str, warnings: &[CoreError]) {
    for warning in warnings {
        warn!(route = route, %warning, "Filter value ignored");
    }
}
