//! # Domain Types
//!
//! Core domain entities used throughout Bodega.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                        │
//! │  │    Category     │ 1    * │    Product      │                        │
//! │  │  ─────────────  │◄───────│  ─────────────  │                        │
//! │  │  id, name       │RESTRICT│  cost, price    │                        │
//! │  └─────────────────┘        │  quantity ≥ 0   │                        │
//! │                             └────────┬────────┘                        │
//! │                                      │ 1 CASCADE                        │
//! │  ┌─────────────────┐ 1    *  ┌───────▼─────────┐                       │
//! │  │      Week       │◄────────│      Sale       │                       │
//! │  │  start..=end    │ CASCADE │  qty, amount    │                       │
//! │  └─────────────────┘         └─────────────────┘                       │
//! │                                                                         │
//! │  Independent ledgers: Purchase, Cost (fixed|variable), AccountEntry     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries `id: Option<i64>`. `None` means "not persisted yet";
//! repositories insert such values and update everything else.
//! Monetary columns are stored as integer cents (`*_cents` fields) with
//! [`Money`] accessors, the same way the database holds them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::period::iso_week_number;

// =============================================================================
// Category
// =============================================================================

/// A product category. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Category {
            id: None,
            name: name.into(),
        }
    }

    /// Whether this is the sentinel "uncategorized" category.
    pub fn is_default(&self) -> bool {
        self.name == crate::DEFAULT_CATEGORY_NAME
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product with its on-hand stock.
///
/// `gross_margin_cents` is derived (`sale_price - cost`) and is recomputed by
/// the repository on every save, so callers never have to keep it in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: Option<i64>,

    /// Display name.
    pub name: String,

    /// Owning category (FK, RESTRICT).
    pub category_id: i64,

    /// Unit cost in cents.
    pub cost_cents: i64,

    /// Unit sale price in cents.
    pub sale_price_cents: i64,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// `sale_price - cost`, in cents.
    pub gross_margin_cents: i64,
}

impl Product {
    /// Builds an unsaved product with its margin already computed.
    pub fn new(
        name: impl Into<String>,
        category_id: i64,
        cost: Money,
        sale_price: Money,
        quantity: i64,
    ) -> Self {
        let mut product = Product {
            id: None,
            name: name.into(),
            category_id,
            cost_cents: cost.cents(),
            sale_price_cents: sale_price.cents(),
            quantity,
            gross_margin_cents: 0,
        };
        product.recompute_margin();
        product
    }

    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    #[inline]
    pub fn gross_margin(&self) -> Money {
        Money::from_cents(self.gross_margin_cents)
    }

    /// Sets `gross_margin = sale_price - cost`.
    pub fn recompute_margin(&mut self) {
        self.gross_margin_cents = (self.sale_price() - self.cost()).cents();
    }
}

/// A category together with its products, as shown in the grouped catalog view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryGroup {
    pub category: Category,
    pub products: Vec<Product>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A supplier purchase. Free text product name; not linked to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: Option<i64>,
    pub product_name: String,
    pub total_cost_cents: i64,
    pub item_count: i64,
    /// Items lost to spoilage. Defaults to 0.
    pub spoilage_count: i64,
    #[ts(as = "String")]
    pub purchase_date: NaiveDate,
}

impl Purchase {
    pub fn new(
        product_name: impl Into<String>,
        total_cost: Money,
        item_count: i64,
        purchase_date: NaiveDate,
    ) -> Self {
        Purchase {
            id: None,
            product_name: product_name.into(),
            total_cost_cents: total_cost.cents(),
            item_count,
            spoilage_count: 0,
            purchase_date,
        }
    }

    /// Sets the spoiled item count.
    pub fn with_spoilage(mut self, spoilage_count: i64) -> Self {
        self.spoilage_count = spoilage_count;
        self
    }

    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    /// `total_cost / item_count`, rounded to the cent.
    ///
    /// Zero when `item_count` is zero or negative. Stored purchases always
    /// have at least one item.
    pub fn unit_cost(&self) -> Money {
        self.total_cost().mul_div_round(1, self.item_count)
    }

    /// `unit_cost × spoilage_count`, computed from the exact unit cost.
    ///
    /// Zero when `item_count` is zero or negative, like [`unit_cost`](Self::unit_cost).
    pub fn loss_value(&self) -> Money {
        self.total_cost()
            .mul_div_round(self.spoilage_count, self.item_count)
    }
}

// =============================================================================
// Week
// =============================================================================

/// A weekly sales period: the closed interval `start_date..=end_date`.
///
/// `week_number` is the ISO-8601 week of `start_date`; it is derived, never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Week {
    pub id: Option<i64>,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub week_number: u32,
}

impl Week {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Week {
            id: None,
            start_date,
            end_date,
            week_number: iso_week_number(start_date),
        }
    }

    /// Rebuilds a stored week from its row values.
    pub fn with_id(id: i64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Week {
            id: Some(id),
            ..Week::new(start_date, end_date)
        }
    }

    /// Whether `date` falls inside this period (inclusive on both ends).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Outcome of an overlap check against the stored weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OverlapCheck {
    pub overlaps: bool,
    /// The first colliding week, when one was identified.
    pub conflicting: Option<Week>,
}

impl OverlapCheck {
    pub fn clear() -> Self {
        OverlapCheck {
            overlaps: false,
            conflicting: None,
        }
    }

    pub fn conflict(week: Week) -> Self {
        OverlapCheck {
            overlaps: true,
            conflicting: Some(week),
        }
    }

    /// Overlap assumed because the check could not run.
    pub fn unknown() -> Self {
        OverlapCheck {
            overlaps: true,
            conflicting: None,
        }
    }
}

/// Result of deleting a week, reporting the sales the cascade discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeekDeletion {
    pub week_id: i64,
    pub discarded_sales: i64,
}

// =============================================================================
// Cost
// =============================================================================

/// Whether a cost is a fixed monthly amount or a variable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CostKind {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "fijo"))]
    Fixed,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "variable"))]
    Variable,
}

impl CostKind {
    /// Stored column value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CostKind::Fixed => "fijo",
            CostKind::Variable => "variable",
        }
    }
}

impl std::fmt::Display for CostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named operating cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Cost {
    pub id: Option<i64>,
    pub name: String,
    pub amount_cents: i64,
    pub kind: CostKind,
}

impl Cost {
    pub fn new(name: impl Into<String>, amount: Money, kind: CostKind) -> Self {
        Cost {
            id: None,
            name: name.into(),
            amount_cents: amount.cents(),
            kind,
        }
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Units of one product sold during one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: Option<i64>,
    pub week_id: i64,
    pub product_id: i64,
    pub quantity_sold: i64,
    pub amount_cents: i64,
}

impl Sale {
    pub fn new(week_id: i64, product_id: i64, quantity_sold: i64, amount: Money) -> Self {
        Sale {
            id: None,
            week_id,
            product_id,
            quantity_sold,
            amount_cents: amount.cents(),
        }
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Receivables / Payables
// =============================================================================

/// Which side of the books an [`AccountEntry`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Money owed to the shop.
    Receivable,
    /// Money the shop owes.
    Payable,
}

/// A receivable or payable: who, how much, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AccountEntry {
    pub id: Option<i64>,
    pub counterparty_name: String,
    pub amount_cents: i64,
    pub description: Option<String>,
}

impl AccountEntry {
    pub fn new(counterparty_name: impl Into<String>, amount: Money) -> Self {
        AccountEntry {
            id: None,
            counterparty_name: counterparty_name.into(),
            amount_cents: amount.cents(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
