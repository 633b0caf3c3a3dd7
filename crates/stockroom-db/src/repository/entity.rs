//! # Entity Repository
//!
//! Update-by-id and delete-by-id for every table, driven by the compiled
//! statements from `stockroom_core::update`.
//!
//! Both operations treat zero affected rows as [`DbError::NotFound`].

use sqlx::SqlitePool;
use tracing::debug;

use stockroom_core::{compile_delete, compile_update, Entity, UpdatePayload};

use super::bind_query;
use crate::error::{DbError, DbResult};

/// Repository for allow-listed partial updates and deletes.
#[derive(Debug, Clone)]
pub struct EntityRepository {
    pool: SqlitePool,
}

impl EntityRepository {
    /// Creates a new EntityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EntityRepository { pool }
    }

    /// Applies a validated partial update to the row with `id`.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] when no row has that id
    /// - [`DbError::ForeignKeyViolation`] when a reference column points nowhere
    pub async fn apply_update(&self, payload: &UpdatePayload, id: i64) -> DbResult<()> {
        let entity = payload.entity();
        let statement = compile_update(payload, id);

        debug!(
            entity = %entity,
            id = id,
            columns = ?payload.columns().collect::<Vec<_>>(),
            "Applying update"
        );

        let result = bind_query(statement.sql(), statement.params())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(entity.label(), id));
        }

        Ok(())
    }

    /// Deletes the row with `id`.
    pub async fn delete(&self, entity: Entity, id: i64) -> DbResult<()> {
        let statement = compile_delete(entity, id);

        debug!(entity = %entity, id = id, "Deleting row");

        let result = bind_query(statement.sql(), statement.params())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(entity.label(), id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::repository::test_support::{insert_item, seeded_db};

    fn payload(entity: Entity, body: serde_json::Value) -> UpdatePayload {
        match body {
            serde_json::Value::Object(map) => UpdatePayload::from_json(entity, &map).unwrap(),
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_update_touches_only_named_column_of_one_row() {
        let db = seeded_db().await;
        insert_item(&db, 7, "A7", 1, 0).await;
        insert_item(&db, 8, "A8", 1, 1).await;

        let before = db.items().get_by_id(7).await.unwrap().unwrap();

        db.entities()
            .apply_update(&payload(Entity::Item, json!({"priceOne": 12.5})), 7)
            .await
            .unwrap();

        let after = db.items().get_by_id(7).await.unwrap().unwrap();
        assert_eq!(after.price_one, 12.5);
        assert_eq!(after.buy_price, before.buy_price);
        assert_eq!(after.sku, before.sku);
        assert_eq!(after.quantity, before.quantity);

        let neighbour = db.items().get_by_id(8).await.unwrap().unwrap();
        assert_eq!(neighbour.price_one, 2.0);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let db = seeded_db().await;

        let err = db
            .entities()
            .apply_update(&payload(Entity::Item, json!({"priceOne": 1.0})), 404)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "item"));
    }

    #[tokio::test]
    async fn test_multi_field_update_on_customer() {
        let db = seeded_db().await;

        db.entities()
            .apply_update(
                &payload(
                    Entity::Customer,
                    json!({"remark": "VIP", "name": "Omar K", "delFee": 3}),
                ),
                2,
            )
            .await
            .unwrap();

        let customer = db.contacts().get_customer(2).await.unwrap().unwrap();
        assert_eq!(customer.name, "Omar K");
        assert_eq!(customer.remark.as_deref(), Some("VIP"));
        assert_eq!(customer.del_fee, 3.0);
    }

    #[tokio::test]
    async fn test_update_with_dangling_reference_fails() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 0).await;

        let err = db
            .entities()
            .apply_update(&payload(Entity::Item, json!({"brand": 999})), 1)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_numeric_text_is_stored_as_integer() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 0).await;

        db.entities()
            .apply_update(&payload(Entity::Item, json!({"quantity": " 12 "})), 1)
            .await
            .unwrap();

        let filter = stockroom_core::ItemFilter::from_params(&Default::default()).value;
        let rows = db.items().search(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 12);
    }

    #[tokio::test]
    async fn test_mistyped_value_never_reaches_the_table() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 0).await;

        let mut body = serde_json::Map::new();
        body.insert("quantity".into(), json!("abc"));
        let err = UpdatePayload::from_json(Entity::Item, &body).unwrap_err();
        assert!(matches!(err, stockroom_core::CoreError::InvalidFieldValue { .. }));

        let filter = stockroom_core::ItemFilter::from_params(&Default::default()).value;
        let rows = db.items().search(&filter).await.unwrap();
        assert_eq!(rows[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = seeded_db().await;
        insert_item(&db, 1, "A1", 1, 0).await;

        db.entities().delete(Entity::Item, 1).await.unwrap();
        assert!(db.items().get_by_id(1).await.unwrap().is_none());

        let err = db.entities().delete(Entity::Item, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
