//! # bodega-db: Storage Layer for Bodega
//!
//! SQLite persistence for the catalog, weekly periods, the sales ledger and
//! the accounting reports, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bodega Data Flow                                 │
//! │                                                                         │
//! │  Caller (UI command, seed binary, tests)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bodega-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CategoryRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 001_initial_ │  │   │
//! │  │   │ LedgerConfig  │    │ SaleRepo ─────┼──► UnitOfWork     │  │   │
//! │  │   │ Bootstrap     │    │ AccountingRepo│    │   schema.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                        │                                        │
//! │       ▼                        ▼                                        │
//! │  ┌──────────────────┐   ┌─────────────────────────────────────────┐    │
//! │  │  SQLite file     │   │  bodega-core: entities, validation,     │    │
//! │  │  (bodega.db)     │   │  margin math                            │    │
//! │  └──────────────────┘   └─────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, configuration, bootstrap
//! - [`config`] - Accounting settings ([`LedgerConfig`])
//! - [`migrations`] - Embedded database migrations
//! - [`unit_of_work`] - Transaction wrapper for ledger writes
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table family
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bodega_db::{Database, DbConfig};
//! use bodega_core::{Money, Sale};
//!
//! let db = Database::new(DbConfig::new("bodega.db")).await?;
//!
//! let sale = db.sales().create(&Sale::new(week_id, product_id, 3, Money::from_cents(450))).await?;
//! let margin = db.accounting().net_margin_for_week(week_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::LedgerConfig;
pub use error::{DbError, DbResult, ErrorKind};
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;

// Repository re-exports for convenience
pub use repository::{
    AccountRepository, AccountingRepository, CategoryRepository, CostRepository,
    ProductRepository, PurchaseRepository, SaleRepository, WeekRepository,
};
