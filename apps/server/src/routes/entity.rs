//! # Update and Delete by Id
//!
//! Every `PUT /{table}/{id}` and `DELETE /{table}/{id}` in the API lands
//! here, so all eleven tables share one allow-listed update path.
//!
//! ## Update Flow
//! ```text
//! PUT /items/7  {"priceOne": 12.5}
//!      │
//!      ▼
//! UpdatePayload::from_json(Entity::Item, body)   ← EmptyUpdate / UnknownField / InvalidFieldValue
//!      │
//!      ▼
//! EntityRepository::apply_update(&payload, 7)    ← NotFound on zero rows
//!      │
//!      ▼
//! 200 {"id": 7, "priceOne": 12.5}
//! ```

use axum::extract::{Path, State};
use axum::routing::{delete, MethodRouter};
use axum::Json;
use serde_json::{Map, Value};
use tracing::debug;

use stockroom_core::{Entity, UpdatePayload, WriteResult};

use crate::error::ApiResult;
use crate::state::AppState;

/// PUT and DELETE handlers for one entity, ready to mount on `/{table}/{id}`.
///
/// Chain `.get(...)` onto the result for tables that also serve reads by id.
pub fn by_id(entity: Entity) -> MethodRouter<AppState> {
    delete(
        move |State(state): State<AppState>, Path(id): Path<i64>| async move {
            remove(&state, entity, id).await
        },
    )
    .put(
        move |State(state): State<AppState>,
              Path(id): Path<i64>,
              Json(body): Json<Map<String, Value>>| async move {
            update(&state, entity, id, body).await
        },
    )
}

/// Applies a partial update and echoes the changed fields with the id.
pub async fn update(
    state: &AppState,
    entity: Entity,
    id: i64,
    body: Map<String, Value>,
) -> ApiResult<Json<Value>> {
    debug!(entity = %entity, id = id, fields = body.len(), "update command");

    let payload = UpdatePayload::from_json(entity, &body)?;
    state.db.entities().apply_update(&payload, id).await?;

    let mut echoed = Map::with_capacity(body.len() + 1);
    echoed.insert("id".to_string(), Value::from(id));
    echoed.extend(body);

    Ok(Json(Value::Object(echoed)))
}

/// Deletes one row by id.
pub async fn remove(state: &AppState, entity: Entity, id: i64) -> ApiResult<Json<WriteResult>> {
    debug!(entity = %entity, id = id, "delete command");

    state.db.entities().delete(entity, id).await?;
    Ok(Json(WriteResult::affected(1)))
}
