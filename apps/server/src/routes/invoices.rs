//! # POS Invoice Routes
//!
//! ## Filter Parameters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /posinvoicesFilter                                                 │
//! │                                                                         │
//! │  required  startDate, endDate   YYYY-MM-DD, inclusive on the day        │
//! │            checkIcon            contains "fa-circle-check" → Paid,      │
//! │                                 otherwise → Canceled                    │
//! │            search               comma-separated item ids; when the      │
//! │                                 first is non-empty, rows must contain   │
//! │                                 one of them or match searchVal          │
//! │  optional  searchVal            free text over note/id/names            │
//! │            priceSelectVal       price level, "All" for any              │
//! │            deliverySelectVal    "Both" | "Delivery" | a driver name     │
//! │            customer, delivery, worker   name substrings                 │
//! │            limit                row cap (default: 50)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing required parameter is a 400; the other inputs degrade to
//! "no constraint".

use std::collections::HashMap;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, info};

use stockroom_core::validation::validate_name;
use stockroom_core::{Entity, InvoiceFilter, InvoiceRow, NewInvoice, WriteResult};

use super::{entity, log_filter_warnings, parse_body};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posinvoices", get(list_invoices).post(create_invoice))
        .route("/posinvoicesFilter", get(filter_invoices))
        .route(
            "/posinvoices/{id}",
            entity::by_id(Entity::PosInvoice).get(get_invoice),
        )
}

/// Lists every invoice, newest first.
async fn list_invoices(State(state): State<AppState>) -> ApiResult<Json<Vec<InvoiceRow>>> {
    debug!("list_invoices command");
    Ok(Json(state.db.invoices().list().await?))
}

async fn filter_invoices(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<InvoiceRow>>> {
    let start = Instant::now();

    let normalized = InvoiceFilter::from_params(&params)?;
    log_filter_warnings("/posinvoicesFilter", &normalized.warnings);
    let filter = normalized.value;

    debug!(
        start_date = %filter.start_date,
        end_date = %filter.end_date,
        status = filter.status.as_str(),
        delivery = ?filter.delivery,
        item_ids = filter.item_ids.len(),
        limit = filter.limit,
        "filter_invoices command"
    );

    let rows = state.db.invoices().search(&filter).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = rows.len(),
        "filter_invoices complete"
    );

    Ok(Json(rows))
}

async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<InvoiceRow>> {
    debug!(id = id, "get_invoice command");

    state
        .db
        .invoices()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(Entity::PosInvoice.label(), id))
}

async fn create_invoice(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<WriteResult>> {
    let invoice: NewInvoice = parse_body(body)?;
    validate_name("invStatus", &invoice.inv_status)?;

    let id = state.db.invoices().insert(&invoice).await?;
    info!(
        id = id,
        customer_id = invoice.customer_id,
        net_total = invoice.net_total,
        "Invoice created"
    );

    Ok(Json(WriteResult::inserted(id)))
}
