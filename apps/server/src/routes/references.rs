//! # Reference Table Routes
//!
//! Brand, model, category and quality: the lookups an item points at.
//! Plain listing and insert; `GET /model` also takes `search` and `limit`
//! for the model picker.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::routing::{post, MethodRouter};
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, info};

use stockroom_core::validation::validate_name;
use stockroom_core::{CategoryRow, ModelFilter, NamedRow, NewName, WriteResult};
use stockroom_db::ReferenceTable;

use super::{entity, log_filter_warnings, parse_body};
use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let mut router = Router::new()
        .route("/brand", create_route(ReferenceTable::Brand).get(list_brands))
        .route("/model", create_route(ReferenceTable::Model).get(search_models))
        .route(
            "/category",
            create_route(ReferenceTable::Category).get(list_categories),
        )
        .route(
            "/quality",
            create_route(ReferenceTable::Quality).get(list_qualities),
        );

    for table in [
        ReferenceTable::Brand,
        ReferenceTable::Model,
        ReferenceTable::Category,
        ReferenceTable::Quality,
    ] {
        router = router.route(
            &format!("/{}/{{id}}", table.table()),
            entity::by_id(table.entity()),
        );
    }

    router
}

/// `POST /{table}` with a `{"name": ...}` body.
fn create_route(table: ReferenceTable) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>, Json(body): Json<Value>| async move {
            create(&state, table, body).await
        },
    )
}

async fn list_brands(State(state): State<AppState>) -> ApiResult<Json<Vec<NamedRow>>> {
    debug!("list_brands command");
    Ok(Json(state.db.references().list(ReferenceTable::Brand).await?))
}

async fn list_qualities(State(state): State<AppState>) -> ApiResult<Json<Vec<NamedRow>>> {
    debug!("list_qualities command");
    Ok(Json(state.db.references().list(ReferenceTable::Quality).await?))
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryRow>>> {
    debug!("list_categories command");
    Ok(Json(state.db.references().list_categories().await?))
}

/// Model lookup by name substring, newest first.
///
/// ## Query Parameters
/// * `search` - Name substring (default: empty, matches all)
/// * `limit` - Row cap (default: 1,000,000)
async fn search_models(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<NamedRow>>> {
    let normalized = ModelFilter::from_params(&params);
    log_filter_warnings("/model", &normalized.warnings);
    let filter = normalized.value;

    debug!(search = %filter.search, limit = filter.limit, "search_models command");

    Ok(Json(
        state
            .db
            .references()
            .search_models(&filter.search, filter.limit)
            .await?,
    ))
}

async fn create(
    state: &AppState,
    table: ReferenceTable,
    body: Value,
) -> ApiResult<Json<WriteResult>> {
    let row: NewName = parse_body(body)?;
    validate_name("name", &row.name)?;

    let id = state.db.references().insert(table, row.name.trim()).await?;
    info!(table = table.table(), id = id, "Reference row created");

    Ok(Json(WriteResult::inserted(id)))
}
