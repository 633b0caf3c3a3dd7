//! # Loan Routes
//!
//! `GET /loans/{id}` reads by customer id while `PUT` and `DELETE` on the
//! same path address one loan row; the frontend has always used it that way.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, info};

use stockroom_core::{Entity, LoanRecord, LoanRow, NewLoan, WriteResult};

use super::{entity, parse_body};
use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans).post(create_loan))
        .route(
            "/loans/{id}",
            entity::by_id(Entity::Loan).get(list_customer_loans),
        )
        .route("/oneloan/{invoice_num}", get(list_invoice_loans))
        .route("/totalLoans/{customer_id}", delete(settle_customer))
}

async fn list_loans(State(state): State<AppState>) -> ApiResult<Json<Vec<LoanRow>>> {
    debug!("list_loans command");
    Ok(Json(state.db.loans().list().await?))
}

async fn list_customer_loans(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> ApiResult<Json<Vec<LoanRow>>> {
    debug!(customer_id = customer_id, "list_customer_loans command");
    Ok(Json(state.db.loans().list_for_customer(customer_id).await?))
}

async fn list_invoice_loans(
    State(state): State<AppState>,
    Path(invoice_num): Path<i64>,
) -> ApiResult<Json<Vec<LoanRecord>>> {
    debug!(invoice_num = invoice_num, "list_invoice_loans command");
    Ok(Json(state.db.loans().list_for_invoice(invoice_num).await?))
}

async fn create_loan(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<WriteResult>> {
    let loan: NewLoan = parse_body(body)?;

    let id = state.db.loans().insert(&loan).await?;
    info!(id = id, customer_id = loan.customer_id, amount = loan.amount, "Loan created");

    Ok(Json(WriteResult::inserted(id)))
}

/// Removes every loan of a customer. Zero rows is a success.
async fn settle_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> ApiResult<Json<WriteResult>> {
    let removed = state.db.loans().delete_for_customer(customer_id).await?;
    info!(customer_id = customer_id, removed = removed, "Customer loans cleared");

    Ok(Json(WriteResult::affected(removed)))
}
