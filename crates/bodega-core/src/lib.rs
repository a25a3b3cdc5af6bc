//! # bodega-core: Pure Business Logic for Bodega
//!
//! This crate holds the domain model of a small shop's back office: the
//! catalog, weekly sales periods, costs and the margin arithmetic that ties
//! them together. Everything here is a pure function over plain values.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bodega Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  UI collaborator (forms + tables)               │   │
//! │  │   Catalog ──► Weeks ──► Sales ──► Costs ──► Reports             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ids + values                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bodega-db (Database Layer)                   │   │
//! │  │     repositories, unit of work, sales ledger, aggregator        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bodega-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  period   │  │accounting │  │   │
//! │  │   │  Product  │  │   Money   │  │ ISO week  │  │ net margin│  │   │
//! │  │   │   Sale    │  │  Percent  │  │ overlaps  │  │  reports  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Category, Product, Week, Sale, Cost, ...)
//! - [`money`] - Money and Percent with integer arithmetic (no floating point!)
//! - [`period`] - Weekly period rules: ISO week numbers, overlap predicate
//! - [`accounting`] - Net margin math and report records
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use bodega_core::accounting::{net_margin_for_week, MarginParams};
//! use bodega_core::money::Money;
//!
//! let revenue = Money::from_cents(100_000);   // $1000.00 sold this week
//! let fixed = Money::from_cents(433_000);     // $4330.00 monthly fixed costs
//!
//! let report = net_margin_for_week(revenue, fixed, &MarginParams::default());
//!
//! // 1000 - 4330/4.33 - 30% of 1000 = -300
//! assert_eq!(report.net_margin.cents(), -30_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod accounting;
pub mod error;
pub mod money;
pub mod period;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percent};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name of the sentinel category that collects uncategorized products.
///
/// The row is created at bootstrap, can never be deleted, and receives the
/// products of any category deleted with "move to default".
pub const DEFAULT_CATEGORY_NAME: &str = "Sin Categoría";

/// Default share of revenue booked as variable cost (30%).
pub const DEFAULT_VARIABLE_COST_BPS: u32 = 3000;

/// Average weeks per month, in hundredths (4.33).
///
/// Fixed costs are entered as monthly amounts and spread over weeks with
/// this divisor.
pub const WEEKS_PER_MONTH_HUNDREDTHS: u32 = 433;
