//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Filter and update composition failures         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Server errors (in app)                                                │
//! │  └── ApiError         - What the HTTP client sees (serialized)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while turning request input into SQL.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A filter input the query cannot be built without is absent.
    ///
    /// ## When This Occurs
    /// - `/posinvoicesFilter` called without `search`, `checkIcon`,
    ///   `startDate` or `endDate`
    #[error("Missing required parameter: {name}")]
    MissingParameter { name: String },

    /// A filter input could not be parsed.
    ///
    /// Non-fatal where a default exists (e.g. `limit`): the normalizer
    /// reports it as a warning and substitutes the default.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidFilterValue { name: String, value: String },

    /// An update request carried no fields.
    #[error("No fields provided for {entity} update")]
    EmptyUpdate { entity: String },

    /// An update request named a column outside the entity's allow-list.
    #[error("Unknown field '{field}' for {entity}")]
    UnknownField { entity: String, field: String },

    /// An update value the target column cannot store.
    ///
    /// ## When This Occurs
    /// - `{"quantity": "abc"}` for an integer column
    /// - `null` for a required column such as `SKU`
    #[error("Invalid value for {entity}.{field}: expected {expected}")]
    InvalidFieldValue {
        entity: String,
        field: String,
        expected: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a MissingParameter error.
    pub fn missing(name: impl Into<String>) -> Self {
        CoreError::MissingParameter { name: name.into() }
    }

    /// Creates an InvalidFilterValue error.
    pub fn invalid(name: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::InvalidFilterValue {
            name: name.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a request body doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Duplicate value inside one request.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
