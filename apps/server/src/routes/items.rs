//! # Item Routes
//!
//! Listing, filtered search, single lookup, insert and display-order
//! updates for the items table.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Item Search Flow                                     │
//! │                                                                         │
//! │  GET /itemsFilter?search=galaxy%20glass&brandDivVal=Select%20brand..    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ItemFilter::from_params  ← sentinels dropped, "plus" → "+", limit 70   │
//! │       │                     (bad limit: warning logged, default used)   │
//! │       ▼                                                                 │
//! │  ItemRepository::search   ← one OR group per term, AND between them     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<ItemRow> ordered by display_order                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value};
use tracing::{debug, info};

use stockroom_core::validation::{validate_ordered_ids, validate_sku};
use stockroom_core::{
    CoreError, Entity, ItemDetail, ItemFilter, ItemRow, NewItem, ReorderRequest, WriteResult,
};

use super::{entity, log_filter_warnings, parse_body};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/itemsFilter", get(filter_items))
        .route("/items/{id}", entity::by_id(Entity::Item).get(get_item))
        .route("/update-order", post(update_order))
}

/// Lists every item in display order.
async fn list_items(State(state): State<AppState>) -> ApiResult<Json<Vec<ItemRow>>> {
    debug!("list_items command");
    Ok(Json(state.db.items().list().await?))
}

/// Filtered item search.
///
/// ## Query Parameters
/// * `search` - Space-separated terms; every term must match some column
/// * `brandDivVal` - Brand name, or `Select brand..` for any
/// * `categoryDivVal` - Category name (`plus` stands for `+`), or `Select category..`
/// * `limit` - Row cap (default: 70)
async fn filter_items(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<ItemRow>>> {
    let start = Instant::now();

    let normalized = ItemFilter::from_params(&params);
    log_filter_warnings("/itemsFilter", &normalized.warnings);
    let filter = normalized.value;

    debug!(
        terms = ?filter.search_terms,
        brand = ?filter.brand,
        category = ?filter.category,
        limit = filter.limit,
        "filter_items command"
    );

    let rows = state.db.items().search(&filter).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = rows.len(),
        "filter_items complete"
    );

    Ok(Json(rows))
}

/// Gets a single item with its reference ids and names.
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ItemDetail>> {
    debug!(id = id, "get_item command");

    state
        .db
        .items()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("item", id))
}

/// Inserts an item and echoes the body with its id.
async fn create_item(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let item: NewItem = parse_body(Value::Object(body.clone()))?;
    validate_sku(&item.sku)?;

    let id = state.db.items().insert(&item).await?;
    info!(id = id, sku = %item.sku, "Item created");

    let mut echoed = Map::with_capacity(body.len() + 1);
    echoed.insert("id".to_string(), Value::from(id));
    echoed.extend(body.into_iter().filter(|(key, _)| key != "id"));

    Ok(Json(Value::Object(echoed)))
}

/// Rewrites `display_order` so items appear in the given id order.
///
/// All-or-nothing: an unknown id leaves every row untouched.
async fn update_order(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<WriteResult>> {
    let request: ReorderRequest = parse_body(body)?;

    if request.ordered_items.is_empty() {
        return Err(CoreError::EmptyUpdate {
            entity: Entity::Item.table().to_string(),
        }
        .into());
    }
    validate_ordered_ids(&request.ordered_items)?;

    debug!(count = request.ordered_items.len(), "update_order command");

    state.db.items().reorder(&request.ordered_items).await?;

    Ok(Json(WriteResult::affected(request.ordered_items.len() as u64)))
}
