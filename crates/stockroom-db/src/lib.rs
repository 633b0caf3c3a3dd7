//! # stockroom-db: Database Layer for Stockroom
//!
//! Runs the statements composed by `stockroom-core` against SQLite, with
//! sqlx for async access and pooling.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (GET /itemsFilter)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ItemRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ InvoiceRepo   │    │ 001_initial_ │  │   │
//! │  │   │ WAL, FKs on   │    │ EntityRepo    │    │ schema.sql   │  │   │
//! │  │   │               │    │ ...           │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                   (./stockroom.db by default)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table family
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_core::ItemFilter;
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockroom.db")).await?;
//!
//! let filter = ItemFilter::from_params(&params).value;
//! let items = db.items().search(&filter).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::contact::{ContactRepository, PersonTable};
pub use repository::entity::EntityRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::item::ItemRepository;
pub use repository::loan::LoanRepository;
pub use repository::reference::{ReferenceRepository, ReferenceTable};
pub use repository::stock_entry::StockEntryRepository;
