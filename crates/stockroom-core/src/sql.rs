//! # SQL Fragments
//!
//! The unit of exchange between the composers in this crate and the
//! database layer: SQL text with positional `?` placeholders plus the
//! values bound to them, in placeholder order.
//!
//! ## Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "LOWER(b.name) LIKE ? OR LOWER(m.name) LIKE ?"   params: ["%a%","%a%"] │
//! │                     ▲                      ▲               ▲      ▲     │
//! │                     └──────── 1st ─────────┼───────────────┘      │     │
//! │                                            └──── 2nd ─────────────┘     │
//! │                                                                         │
//! │  placeholders == params.len(), bound left to right                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Placeholders only enter a fragment through [`SqlFragment::push_bind`],
//! so the invariant holds by construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Bound Values
// =============================================================================

/// A value bound to a `?` placeholder.
///
/// Mirrors SQLite's storage classes so the database layer can bind each
/// variant with its native encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

/// Converts a JSON request value into a bindable value.
///
/// Arrays and objects are stored as their JSON text, which is how the
/// `items`, `orders` and `itemIds` invoice columns hold their contents.
impl From<&Value> for SqlValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::from(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Real(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
        }
    }
}

// =============================================================================
// Fragment
// =============================================================================

/// SQL text paired with its positional bound parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    sql: String,
    params: Vec<SqlValue>,
}

impl SqlFragment {
    /// Creates an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fragment from parameterless SQL text.
    pub fn raw(sql: impl Into<String>) -> Self {
        let mut fragment = Self::new();
        fragment.push_sql(&sql.into());
        fragment
    }

    /// Appends literal SQL text.
    ///
    /// The text must not contain `?`; use [`push_bind`](Self::push_bind)
    /// for values.
    pub fn push_sql(&mut self, sql: &str) -> &mut Self {
        debug_assert!(
            !sql.contains('?'),
            "placeholders must be added with push_bind: {sql}"
        );
        self.sql.push_str(sql);
        self
    }

    /// Appends a `?` placeholder and records its value.
    pub fn push_bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.sql.push('?');
        self.params.push(value.into());
        self
    }

    /// Appends another fragment, keeping its parameters in order.
    pub fn push_fragment(&mut self, other: SqlFragment) -> &mut Self {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
        self
    }

    /// Returns the SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound values in placeholder order.
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Returns true if no SQL text has been written.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Counts `?` placeholders in the SQL text.
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }

    /// Splits the fragment into its SQL text and parameters.
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

// =============================================================================
// Fragment Constructors
// =============================================================================

/// `column LIKE ?`
pub fn like(column: &str, pattern: impl Into<SqlValue>) -> SqlFragment {
    let mut fragment = SqlFragment::raw(format!("{column} LIKE "));
    fragment.push_bind(pattern);
    fragment
}

/// `column = ?`
pub fn eq(column: &str, value: impl Into<SqlValue>) -> SqlFragment {
    let mut fragment = SqlFragment::raw(format!("{column} = "));
    fragment.push_bind(value);
    fragment
}

/// `column != ?`
pub fn not_eq(column: &str, value: impl Into<SqlValue>) -> SqlFragment {
    let mut fragment = SqlFragment::raw(format!("{column} != "));
    fragment.push_bind(value);
    fragment
}

/// Tests whether a JSON-array column holds `value` as one of its elements.
///
/// Elements are compared as text, so `["12","40"]` and `[12,40]` both
/// contain `"12"`. Malformed JSON is treated as an empty array.
pub fn json_array_contains(column: &str, value: impl Into<SqlValue>) -> SqlFragment {
    let mut fragment = SqlFragment::raw(format!(
        "EXISTS (SELECT 1 FROM json_each(CASE WHEN json_valid({column}) THEN {column} ELSE '[]' END) \
         WHERE CAST(json_each.value AS TEXT) = "
    ));
    fragment.push_bind(value);
    fragment.push_sql(")");
    fragment
}

/// Wraps a term as a substring pattern: `%term%`.
pub fn contains_pattern(term: &str) -> String {
    format!("%{term}%")
}

// =============================================================================
// Unit Tests
// =============================================================================
