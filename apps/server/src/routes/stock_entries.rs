//! # Stock Entry Routes

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, info};

use stockroom_core::{Entity, NewStockEntry, StockEntryRow, WriteResult};

use super::{entity, parse_body};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stockentinvs", get(list_entries).post(create_entry))
        .route(
            "/stockentinvs/{id}",
            entity::by_id(Entity::StockEntry).get(get_entry),
        )
}

async fn list_entries(State(state): State<AppState>) -> ApiResult<Json<Vec<StockEntryRow>>> {
    debug!("list_stock_entries command");
    Ok(Json(state.db.stock_entries().list().await?))
}

async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<StockEntryRow>> {
    debug!(id = id, "get_stock_entry command");

    state
        .db
        .stock_entries()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(Entity::StockEntry.label(), id))
}

async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<WriteResult>> {
    let entry: NewStockEntry = parse_body(body)?;

    let id = state.db.stock_entries().insert(&entry).await?;
    info!(id = id, status = %entry.inv_status, "Stock entry created");

    Ok(Json(WriteResult::inserted(id)))
}
