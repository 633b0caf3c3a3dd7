//! # Dynamic Update Compiler
//!
//! One routine compiles every partial `PUT /{entity}/:id` into a single
//! parameterized `UPDATE`.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  {"priceOne": 12.5, "SKU": "A1"}          PUT /items/7                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  UpdatePayload::from_json(Entity::Item, body)                           │
//! │    ├── empty body            → CoreError::EmptyUpdate                   │
//! │    ├── key not in allow-list → CoreError::UnknownField                  │
//! │    ├── value column can't hold → CoreError::InvalidFieldValue           │
//! │    └── fields re-ordered by the allow-list                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  compile_update(&payload, 7)                                            │
//! │    UPDATE items SET SKU = ?, priceOne = ? WHERE id = ?                  │
//! │    params: ["A1", 12.5, 7]                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Column names only ever come from [`Entity::updatable_columns`]; request
//! keys select from that list and are never written into SQL themselves.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::sql::{SqlFragment, SqlValue};

// =============================================================================
// Entities
// =============================================================================

/// Every table that accepts partial updates and deletes by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Item,
    StockEntry,
    PosInvoice,
    Loan,
    Brand,
    Model,
    Category,
    Quality,
    Customer,
    Delivery,
    Worker,
}

impl Entity {
    pub const ALL: [Entity; 11] = [
        Entity::Item,
        Entity::StockEntry,
        Entity::PosInvoice,
        Entity::Loan,
        Entity::Brand,
        Entity::Model,
        Entity::Category,
        Entity::Quality,
        Entity::Customer,
        Entity::Delivery,
        Entity::Worker,
    ];

    /// Table name. Also the route segment (`/items/:id`, `/brand/:id`).
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Item => "items",
            Entity::StockEntry => "stockentinvs",
            Entity::PosInvoice => "posinvoices",
            Entity::Loan => "loans",
            Entity::Brand => "brand",
            Entity::Model => "model",
            Entity::Category => "category",
            Entity::Quality => "quality",
            Entity::Customer => "customers",
            Entity::Delivery => "deliveries",
            Entity::Worker => "workers",
        }
    }

    /// Human-readable singular name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Entity::Item => "item",
            Entity::StockEntry => "stock entry",
            Entity::PosInvoice => "invoice",
            Entity::Loan => "loan",
            Entity::Brand => "brand",
            Entity::Model => "model",
            Entity::Category => "category",
            Entity::Quality => "quality",
            Entity::Customer => "customer",
            Entity::Delivery => "delivery",
            Entity::Worker => "worker",
        }
    }

    pub fn key_column(&self) -> &'static str {
        "id"
    }

    /// Columns a client may change, in the order they are written to SET.
    pub fn updatable_columns(&self) -> &'static [Column] {
        match self {
            Entity::Item => &ITEM_COLUMNS,
            Entity::StockEntry => &STOCK_ENTRY_COLUMNS,
            Entity::PosInvoice => &INVOICE_COLUMNS,
            Entity::Loan => &LOAN_COLUMNS,
            Entity::Brand | Entity::Model | Entity::Quality => &NAME_COLUMNS,
            Entity::Category => &CATEGORY_COLUMNS,
            Entity::Customer => &CUSTOMER_COLUMNS,
            Entity::Delivery | Entity::Worker => &PERSON_COLUMNS,
        }
    }

    /// Looks up the allow-listed column for `field`.
    fn column(&self, field: &str) -> Option<&'static Column> {
        self.updatable_columns()
            .iter()
            .find(|column| column.name == field)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for Entity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entity::ALL
            .iter()
            .copied()
            .find(|entity| entity.table() == s)
            .ok_or_else(|| CoreError::invalid("entity", s))
    }
}

// =============================================================================
// Columns
// =============================================================================

/// What a column stores, as declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    /// JSON document held as TEXT (`items`, `orders`, `itemIds`).
    JsonText,
    /// `YYYY-MM-DD HH:MM:SS` held as TEXT.
    DateTime,
}

impl ColumnKind {
    fn expected(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "an integer",
            ColumnKind::Real => "a number",
            ColumnKind::Text => "a string",
            ColumnKind::JsonText => "a JSON array or object",
            ColumnKind::DateTime => "a date and time",
        }
    }

    /// Converts `value` into what the column stores, or `None` when it
    /// does not fit. Numeric strings are accepted for numeric columns.
    fn coerce(&self, value: SqlValue) -> Option<SqlValue> {
        match (self, value) {
            (_, SqlValue::Null) => Some(SqlValue::Null),

            (ColumnKind::Integer, SqlValue::Integer(i)) => Some(SqlValue::Integer(i)),
            (ColumnKind::Integer, SqlValue::Real(f)) => whole_number(f).map(SqlValue::Integer),
            (ColumnKind::Integer, SqlValue::Text(s)) => {
                s.trim().parse::<i64>().ok().map(SqlValue::Integer)
            }

            (ColumnKind::Real, SqlValue::Integer(i)) => Some(SqlValue::Real(i as f64)),
            (ColumnKind::Real, SqlValue::Real(f)) => Some(SqlValue::Real(f)),
            (ColumnKind::Real, SqlValue::Text(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(SqlValue::Real),

            (ColumnKind::Text, SqlValue::Text(s)) => Some(SqlValue::Text(s)),
            (ColumnKind::Text, SqlValue::Integer(i)) => Some(SqlValue::Text(i.to_string())),
            (ColumnKind::Text, SqlValue::Real(f)) => Some(SqlValue::Text(f.to_string())),

            (ColumnKind::JsonText, SqlValue::Text(s)) => {
                match serde_json::from_str::<Value>(&s) {
                    Ok(Value::Array(_) | Value::Object(_)) => Some(SqlValue::Text(s)),
                    _ => None,
                }
            }

            (ColumnKind::DateTime, SqlValue::Text(s)) => {
                parse_timestamp(&s).map(|ts| SqlValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()))
            }

            _ => None,
        }
    }
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn whole_number(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, the `T`-separated form, RFC 3339 and a
/// bare date (midnight).
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// One allow-listed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

const fn required(name: &'static str, kind: ColumnKind) -> Column {
    Column {
        name,
        kind,
        nullable: false,
    }
}

const fn optional(name: &'static str, kind: ColumnKind) -> Column {
    Column {
        name,
        kind,
        nullable: true,
    }
}

use ColumnKind::{DateTime as Ts, Integer as Int, JsonText as Json, Real, Text};

static ITEM_COLUMNS: [Column; 14] = [
    required("SKU", Text),
    optional("boxId", Text),
    required("disable", Int),
    required("noExcel", Int),
    required("brand", Int),
    required("model", Int),
    required("category", Int),
    required("quality", Int),
    required("quantity", Int),
    required("buyPrice", Real),
    required("priceOne", Real),
    required("display_order", Int),
    optional("changingId", Text),
    optional("discription", Text),
];

static STOCK_ENTRY_COLUMNS: [Column; 5] = [
    required("nowDate", Ts),
    required("items", Json),
    required("invStatus", Text),
    optional("sku", Text),
    optional("remark", Text),
];

static INVOICE_COLUMNS: [Column; 16] = [
    required("newDate", Ts),
    required("items", Json),
    required("customerId", Int),
    required("delFee", Real),
    optional("deliveryId", Int),
    optional("workerId", Int),
    optional("orders", Json),
    required("total", Real),
    required("discount", Real),
    required("netTotal", Real),
    required("invStatus", Text),
    required("totalQuantity", Int),
    optional("note", Text),
    optional("priceLevel", Text),
    optional("computerName", Text),
    optional("itemIds", Json),
];

static LOAN_COLUMNS: [Column; 5] = [
    required("amount", Real),
    optional("invoiceNum", Int),
    optional("note", Text),
    required("customer_id", Int),
    required("nowDate", Ts),
];

static NAME_COLUMNS: [Column; 1] = [required("name", Text)];

static CATEGORY_COLUMNS: [Column; 2] = [required("name", Text), optional("circle_ball", Int)];

static CUSTOMER_COLUMNS: [Column; 6] = [
    required("name", Text),
    optional("phoneNo", Text),
    required("delFee", Real),
    optional("address", Text),
    optional("remark", Text),
    optional("priceLevel", Text),
];

static PERSON_COLUMNS: [Column; 3] = [
    required("name", Text),
    optional("phoneNo", Text),
    optional("address", Text),
];

// =============================================================================
// Payload
// =============================================================================

/// A validated, non-empty set of column assignments for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePayload {
    entity: Entity,
    assignments: Vec<(&'static str, SqlValue)>,
}

impl UpdatePayload {
    /// Validates `fields` against the entity's allow-list and column types.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyUpdate`] when `fields` is empty
    /// - [`CoreError::UnknownField`] for the first field outside the allow-list
    /// - [`CoreError::InvalidFieldValue`] for a value the column cannot
    ///   store, including null on a required column
    pub fn new(entity: Entity, fields: Vec<(String, SqlValue)>) -> CoreResult<Self> {
        if fields.is_empty() {
            return Err(CoreError::EmptyUpdate {
                entity: entity.table().to_string(),
            });
        }

        let mut assignments = Vec::with_capacity(fields.len());
        for (field, value) in fields {
            let column = entity.column(&field).ok_or_else(|| CoreError::UnknownField {
                entity: entity.table().to_string(),
                field: field.clone(),
            })?;
            let value = checked_value(entity, column, value)?;
            // Last write wins if a column is repeated.
            assignments.retain(|(existing, _)| *existing != column.name);
            assignments.push((column.name, value));
        }

        let order = entity.updatable_columns();
        assignments.sort_by_key(|(name, _)| order.iter().position(|c| c.name == *name));

        Ok(Self { entity, assignments })
    }

    /// Validates a JSON request body.
    ///
    /// Arrays and objects are only accepted by JSON-valued columns.
    pub fn from_json(entity: Entity, body: &Map<String, Value>) -> CoreResult<Self> {
        let mut fields = Vec::with_capacity(body.len());
        for (key, value) in body {
            if let Some(column) = entity.column(key) {
                let structured = matches!(value, Value::Array(_) | Value::Object(_));
                if structured && column.kind != ColumnKind::JsonText {
                    return Err(invalid_value(entity, column));
                }
            }
            fields.push((key.clone(), SqlValue::from(value)));
        }
        Self::new(entity, fields)
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Column names in SET order.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.assignments.iter().map(|(column, _)| *column)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

fn invalid_value(entity: Entity, column: &Column) -> CoreError {
    CoreError::InvalidFieldValue {
        entity: entity.table().to_string(),
        field: column.name.to_string(),
        expected: if column.nullable {
            column.kind.expected().to_string()
        } else {
            format!("{} (not null)", column.kind.expected())
        },
    }
}

fn checked_value(entity: Entity, column: &Column, value: SqlValue) -> CoreResult<SqlValue> {
    if value == SqlValue::Null && !column.nullable {
        return Err(invalid_value(entity, column));
    }
    column
        .kind
        .coerce(value)
        .ok_or_else(|| invalid_value(entity, column))
}

// =============================================================================
// Compilers
// =============================================================================

/// Compiles `UPDATE {table} SET c₁ = ?, ... WHERE id = ?`.
///
/// Values bind in SET order, followed by `key`.
pub fn compile_update(payload: &UpdatePayload, key: i64) -> SqlFragment {
    let entity = payload.entity;
    let mut query = SqlFragment::raw(format!("UPDATE {} SET ", entity.table()));

    for (index, (column, value)) in payload.assignments.iter().enumerate() {
        if index > 0 {
            query.push_sql(", ");
        }
        query.push_sql(column).push_sql(" = ").push_bind(value.clone());
    }

    query
        .push_sql(&format!(" WHERE {} = ", entity.key_column()))
        .push_bind(key);
    query
}

/// Compiles `DELETE FROM {table} WHERE id = ?`.
pub fn compile_delete(entity: Entity, key: i64) -> SqlFragment {
    let mut query = SqlFragment::raw(format!(
        "DELETE FROM {} WHERE {} = ",
        entity.table(),
        entity.key_column()
    ));
    query.push_bind(key);
    query
}

/// Compiles one `display_order` assignment per id; position in the list
/// becomes the new order.
///
/// The caller runs the statements in a single transaction.
pub fn compile_reorder(ordered_ids: &[i64]) -> Vec<SqlFragment> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(position, id)| {
            let mut query = SqlFragment::raw("UPDATE items SET display_order = ");
            query
                .push_bind(position as i64)
                .push_sql(" WHERE id = ")
                .push_bind(*id);
            query
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_single_field_update() {
        let payload =
            UpdatePayload::from_json(Entity::Item, &body(json!({"priceOne": 12.5}))).unwrap();
        let query = compile_update(&payload, 7);

        assert_eq!(query.sql(), "UPDATE items SET priceOne = ? WHERE id = ?");
        assert_eq!(
            query.params(),
            &[SqlValue::Real(12.5), SqlValue::Integer(7)]
        );
    }

    #[test]
    fn test_fields_follow_allow_list_order() {
        let payload = UpdatePayload::new(
            Entity::Loan,
            vec![
                ("note".to_string(), SqlValue::from("partial")),
                ("amount".to_string(), SqlValue::Real(20.0)),
            ],
        )
        .unwrap();
        let query = compile_update(&payload, 3);

        assert_eq!(query.sql(), "UPDATE loans SET amount = ?, note = ? WHERE id = ?");
        assert_eq!(
            query.params(),
            &[
                SqlValue::Real(20.0),
                SqlValue::from("partial"),
                SqlValue::Integer(3)
            ]
        );
    }

    #[test]
    fn test_empty_payload_rejected_for_every_entity() {
        for entity in Entity::ALL {
            let err = UpdatePayload::from_json(entity, &Map::new()).unwrap_err();
            assert_eq!(
                err,
                CoreError::EmptyUpdate {
                    entity: entity.table().to_string()
                }
            );
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = UpdatePayload::from_json(
            Entity::Customer,
            &body(json!({"name": "Omar", "id = 1; DROP TABLE customers; --": 1})),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::UnknownField { entity, .. } if entity == "customers"));
    }

    #[test]
    fn test_repeated_field_keeps_last_value() {
        let payload = UpdatePayload::new(
            Entity::Brand,
            vec![
                ("name".to_string(), SqlValue::from("Old")),
                ("name".to_string(), SqlValue::from("New")),
            ],
        )
        .unwrap();

        assert_eq!(payload.len(), 1);
        let query = compile_update(&payload, 1);
        assert_eq!(query.params()[0], SqlValue::from("New"));
    }

    #[test]
    fn test_json_arrays_bind_as_text() {
        let payload = UpdatePayload::from_json(
            Entity::PosInvoice,
            &body(json!({"itemIds": ["4", "9"], "invStatus": "Canceled"})),
        )
        .unwrap();
        let query = compile_update(&payload, 11);

        assert_eq!(
            query.sql(),
            "UPDATE posinvoices SET invStatus = ?, itemIds = ? WHERE id = ?"
        );
        assert_eq!(query.params()[1], SqlValue::from(r#"["4","9"]"#));
    }

    #[test]
    fn test_mistyped_value_rejected() {
        let err = UpdatePayload::from_json(Entity::Item, &body(json!({"quantity": "abc"})))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidFieldValue {
                entity: "items".to_string(),
                field: "quantity".to_string(),
                expected: "an integer (not null)".to_string(),
            }
        );

        for bad in [
            json!({"quantity": 2.5}),
            json!({"priceOne": "cheap"}),
            json!({"SKU": ["A1"]}),
            json!({"discription": {"text": "x"}}),
        ] {
            let err = UpdatePayload::from_json(Entity::Item, &body(bad.clone())).unwrap_err();
            assert!(matches!(err, CoreError::InvalidFieldValue { .. }), "{bad}");
        }
    }

    #[test]
    fn test_null_only_for_nullable_columns() {
        let err = UpdatePayload::from_json(Entity::Item, &body(json!({"SKU": null}))).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFieldValue { field, .. } if field == "SKU"));

        let payload =
            UpdatePayload::from_json(Entity::Item, &body(json!({"boxId": null}))).unwrap();
        assert_eq!(compile_update(&payload, 1).params()[0], SqlValue::Null);
    }

    #[test]
    fn test_values_coerced_to_column_kind() {
        let payload = UpdatePayload::from_json(
            Entity::PosInvoice,
            &body(json!({
                "totalQuantity": "3",
                "total": 40,
                "note": 17,
                "newDate": "2024-03-01T09:30:00Z"
            })),
        )
        .unwrap();
        let query = compile_update(&payload, 2);

        assert_eq!(
            query.sql(),
            "UPDATE posinvoices SET newDate = ?, total = ?, totalQuantity = ?, note = ? WHERE id = ?"
        );
        assert_eq!(
            query.params(),
            &[
                SqlValue::from("2024-03-01 09:30:00"),
                SqlValue::Real(40.0),
                SqlValue::Integer(3),
                SqlValue::from("17"),
                SqlValue::Integer(2),
            ]
        );

        let payload = UpdatePayload::from_json(Entity::Item, &body(json!({"disable": true}))).unwrap();
        assert_eq!(compile_update(&payload, 1).params()[0], SqlValue::Integer(1));
    }

    #[test]
    fn test_json_and_date_columns_reject_garbage() {
        for bad in [
            json!({"itemIds": "not json"}),
            json!({"items": "42"}),
            json!({"newDate": "yesterday"}),
            json!({"newDate": 20240301}),
        ] {
            let err = UpdatePayload::from_json(Entity::PosInvoice, &body(bad.clone())).unwrap_err();
            assert!(matches!(err, CoreError::InvalidFieldValue { .. }), "{bad}");
        }

        let payload =
            UpdatePayload::from_json(Entity::Loan, &body(json!({"nowDate": "2024-03-01"}))).unwrap();
        assert_eq!(
            compile_update(&payload, 1).params()[0],
            SqlValue::from("2024-03-01 00:00:00")
        );
    }

    #[test]
    fn test_entity_round_trips_through_route_segment() {
        for entity in Entity::ALL {
            assert_eq!(entity.table().parse::<Entity>().unwrap(), entity);
            assert!(!entity.updatable_columns().is_empty());
        }
        assert!("users".parse::<Entity>().is_err());
    }

    #[test]
    fn test_delete_and_reorder() {
        let query = compile_delete(Entity::Worker, 5);
        assert_eq!(query.sql(), "DELETE FROM workers WHERE id = ?");

        let statements = compile_reorder(&[9, 4]);
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[1].params(),
            &[SqlValue::Integer(1), SqlValue::Integer(4)]
        );
    }
}
