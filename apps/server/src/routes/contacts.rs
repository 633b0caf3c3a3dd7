//! # Contact Routes
//!
//! Customers, delivery drivers and workers.

use axum::extract::{Path, State};
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, info};

use stockroom_core::validation::validate_name;
use stockroom_core::{CustomerRow, Entity, NewContact, NewCustomer, PersonRow, WriteResult};
use stockroom_db::PersonTable;

use super::{entity, parse_body};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let mut router = Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            entity::by_id(Entity::Customer).get(get_customer),
        );

    for table in [PersonTable::Delivery, PersonTable::Worker] {
        router = router
            .route(&format!("/{}", table.table()), people_route(table))
            .route(
                &format!("/{}/{{id}}", table.table()),
                person_by_id_route(table),
            );
    }

    router
}

// =============================================================================
// Customers
// =============================================================================

async fn list_customers(State(state): State<AppState>) -> ApiResult<Json<Vec<CustomerRow>>> {
    debug!("list_customers command");
    Ok(Json(state.db.contacts().list_customers().await?))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CustomerRow>> {
    debug!(id = id, "get_customer command");

    state
        .db
        .contacts()
        .get_customer(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(Entity::Customer.label(), id))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<WriteResult>> {
    let customer: NewCustomer = parse_body(body)?;
    validate_name("name", &customer.name)?;

    let id = state.db.contacts().insert_customer(&customer).await?;
    info!(id = id, "Customer created");

    Ok(Json(WriteResult::inserted(id)))
}

// =============================================================================
// Deliveries and Workers
// =============================================================================

/// `GET` and `POST` on `/deliveries` or `/workers`.
fn people_route(table: PersonTable) -> MethodRouter<AppState> {
    get(move |State(state): State<AppState>| async move {
        debug!(table = table.table(), "list_people command");
        state
            .db
            .contacts()
            .list_people(table)
            .await
            .map(Json)
            .map_err(ApiError::from)
    })
    .post(
        move |State(state): State<AppState>, Json(body): Json<Value>| async move {
            create_person(&state, table, body).await
        },
    )
}

/// `GET`, `PUT` and `DELETE` on `/deliveries/{id}` or `/workers/{id}`.
fn person_by_id_route(table: PersonTable) -> MethodRouter<AppState> {
    entity::by_id(table.entity()).get(
        move |State(state): State<AppState>, Path(id): Path<i64>| async move {
            get_person(&state, table, id).await
        },
    )
}

async fn get_person(state: &AppState, table: PersonTable, id: i64) -> ApiResult<Json<PersonRow>> {
    debug!(table = table.table(), id = id, "get_person command");

    state
        .db
        .contacts()
        .get_person(table, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(table.entity().label(), id))
}

async fn create_person(
    state: &AppState,
    table: PersonTable,
    body: Value,
) -> ApiResult<Json<WriteResult>> {
    let person: NewContact = parse_body(body)?;
    validate_name("name", &person.name)?;

    let id = state.db.contacts().insert_person(table, &person).await?;
    info!(table = table.table(), id = id, "Contact created");

    Ok(Json(WriteResult::inserted(id)))
}
