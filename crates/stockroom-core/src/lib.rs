//! # stockroom-core: Query Composition for Stockroom
//!
//! Everything between "raw request input" and "SQL text plus bound values"
//! lives here, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockroom Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    /itemsFilter, /posinvoicesFilter, PUT /{entity}/:id, ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  filter   │  │ predicate │  │  update   │  │   types   │  │   │
//! │  │   │ sentinels │─►│  WHERE .. │  │  SET ..   │  │ rows and  │  │   │
//! │  │   │ terms     │  │  LIMIT ?  │  │ allow-list│  │ payloads  │  │   │
//! │  │   └───────────┘  └─────┬─────┘  └─────┬─────┘  └───────────┘  │   │
//! │  │                        └──────┬───────┘                        │   │
//! │  │                         ┌─────▼─────┐                          │   │
//! │  │                         │    sql    │  SqlFragment, SqlValue   │   │
//! │  │                         └───────────┘                          │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Database Layer)                   │   │
//! │  │         binds SqlFragment params, runs them on SQLite           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`filter`] - Query parameter normalization (sentinels, search terms, limits)
//! - [`predicate`] - WHERE/ORDER BY/LIMIT composition for the filtered searches
//! - [`update`] - Allow-listed partial updates shared by every entity
//! - [`sql`] - SQL fragments with positional bound values
//! - [`types`] - Row and request payload types
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use stockroom_core::filter::ItemFilter;
//! use stockroom_core::predicate::item_search;
//!
//! let mut params = HashMap::new();
//! params.insert("search".to_string(), "A1".to_string());
//! params.insert("brandDivVal".to_string(), "Select brand..".to_string());
//!
//! let filter = ItemFilter::from_params(&params).value;
//! let query = item_search("SELECT i.id FROM items i", &filter);
//!
//! assert_eq!(query.placeholder_count(), query.params().len());
//! assert_eq!(filter.brand, None);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filter;
pub mod predicate;
pub mod sql;
pub mod types;
pub mod update;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use filter::{DeliveryFilter, InvoiceFilter, InvoiceStatus, ItemFilter, ModelFilter, Normalized};
pub use sql::{SqlFragment, SqlValue};
pub use types::*;
pub use update::{
    compile_delete, compile_reorder, compile_update, Column, ColumnKind, Entity, UpdatePayload,
};
