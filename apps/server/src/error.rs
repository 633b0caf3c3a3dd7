//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  Handler                                                                │
//! │  Result<T, ApiError>                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  CoreError::UnknownField ──────────────┐                                │
//! │  DbError::NotFound ────────────────────┼──► ApiError ──► IntoResponse   │
//! │  DbError::PoolExhausted ───────────────┘        │                       │
//! │                                                 ▼                       │
//! │                              404 / 400 / 503 / 500 + JSON body          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged here and replaced by a generic message; the
//! client never sees SQL or driver text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "UNKNOWN_FIELD",
///   "message": "Unknown field 'password' for items"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Required query parameter absent (400)
    MissingParameter,

    /// Unparseable filter value with no default (400)
    InvalidFilterValue,

    /// Update body with no fields (400)
    EmptyUpdate,

    /// Update body naming a column outside the allow-list (400)
    UnknownField,

    /// Update value the column cannot store (400)
    InvalidFieldValue,

    /// Input validation failed (400)
    ValidationError,

    /// Pool exhausted or connection failed (503)
    DatabaseUnavailable,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MissingParameter
            | ErrorCode::InvalidFilterValue
            | ErrorCode::EmptyUpdate
            | ErrorCode::UnknownField
            | ErrorCode::InvalidFieldValue
            | ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, .. } => {
                warn!("Unique violation on {}", field);
                ApiError::validation("Record already exists")
            }
            DbError::ConstraintViolation { message } => {
                warn!("Constraint violation: {}", message);
                ApiError::validation("Value violates a column constraint")
            }
            DbError::ForeignKeyViolation { message } => {
                warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseUnavailable, "Database unavailable")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseUnavailable, "Database unavailable")
            }
            DbError::MigrationFailed(e) => {
                error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match err {
            CoreError::MissingParameter { .. } => ErrorCode::MissingParameter,
            CoreError::InvalidFilterValue { .. } => ErrorCode::InvalidFilterValue,
            CoreError::EmptyUpdate { .. } => ErrorCode::EmptyUpdate,
            CoreError::UnknownField { .. } => ErrorCode::UnknownField,
            CoreError::InvalidFieldValue { .. } => ErrorCode::InvalidFieldValue,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let cases = [
            (ApiError::from(DbError::not_found("item", 7)), StatusCode::NOT_FOUND),
            (ApiError::from(CoreError::missing("search")), StatusCode::BAD_REQUEST),
            (
                ApiError::from(CoreError::EmptyUpdate {
                    entity: "items".into(),
                }),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(DbError::PoolExhausted), StatusCode::SERVICE_UNAVAILABLE),
            (
                ApiError::from(DbError::ConnectionFailed("refused".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(DbError::QueryFailed("near \"FROM\": syntax error".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.code.status(), status, "{err}");
        }
    }

    #[test]
    fn test_internal_text_is_masked() {
        let err = ApiError::from(DbError::QueryFailed("no such column: secret".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("secret"));
    }

    #[test]
    fn test_bad_input_from_database_is_bad_request() {
        let unique = ApiError::from(DbError::UniqueViolation {
            field: "items.id".into(),
            value: "unknown".into(),
        });
        assert_eq!(unique.code, ErrorCode::ValidationError);
        assert!(!unique.message.contains("items"));

        let not_null = ApiError::from(DbError::ConstraintViolation {
            message: "NOT NULL constraint failed: items.SKU".into(),
        });
        assert_eq!(not_null.code.status(), StatusCode::BAD_REQUEST);
        assert!(!not_null.message.contains("items.SKU"));

        let mistyped = ApiError::from(CoreError::InvalidFieldValue {
            entity: "items".into(),
            field: "quantity".into(),
            expected: "an integer".into(),
        });
        assert_eq!(mistyped.code, ErrorCode::InvalidFieldValue);
        assert_eq!(mistyped.code.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CoreError::UnknownField {
            entity: "items".into(),
            field: "password".into(),
        });
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "UNKNOWN_FIELD");
        assert_eq!(json["message"], "Unknown field 'password' for items");
    }
}
