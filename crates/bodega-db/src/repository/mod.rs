//! # Repository Module
//!
//! One repository per table family. Each holds a cloned `SqlitePool` and is
//! handed out by [`crate::Database`].
//!
//! ## Repository Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog           CategoryRepository   categorias                      │
//! │                    ProductRepository    productos                       │
//! │                                                                         │
//! │  Periods           WeekRepository       semanas (non-overlapping)       │
//! │                                                                         │
//! │  Sales ledger      SaleRepository       ventas + productos.cantidad     │
//! │                                         (UnitOfWork per write)          │
//! │                                                                         │
//! │  Independent       CostRepository       costos                          │
//! │  ledgers           PurchaseRepository   compras                         │
//! │                    AccountRepository    cuentas_cobrar | cuentas_pagar  │
//! │                                                                         │
//! │  Reports           AccountingRepository read-only sums + core math      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `save` inserts when `id` is `None` and updates otherwise; updating
//! an unknown id is `NotFound`.

pub mod account;
pub mod accounting;
pub mod category;
pub mod cost;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod week;

pub use account::AccountRepository;
pub use accounting::AccountingRepository;
pub use category::CategoryRepository;
pub use cost::CostRepository;
pub use product::ProductRepository;
pub use purchase::PurchaseRepository;
pub use sale::SaleRepository;
pub use week::WeekRepository;
