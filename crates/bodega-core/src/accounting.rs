//! # Accounting Math
//!
//! Deterministic margin arithmetic and the report records the aggregator
//! returns. The database layer only gathers the three inputs (revenue,
//! monthly fixed costs, number of weeks); everything else happens here.
//!
//! ## Net Margin
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  revenue            = Σ sale.amount over the selected weeks             │
//! │  fixed share        = Σ fixed cost.amount ÷ 4.33 × weeks                │
//! │  variable estimate  = revenue × variable_cost_percent (default 30%)     │
//! │                                                                         │
//! │  net margin         = revenue − fixed share − variable estimate         │
//! │  margin percent     = net ÷ revenue × 100      (0 when revenue is 0)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Report fields serialize with the column names the reporting screens
//! already use (`total_ventas`, `margen_neto`, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Percent};
use crate::{DEFAULT_VARIABLE_COST_BPS, WEEKS_PER_MONTH_HUNDREDTHS};

// =============================================================================
// Parameters
// =============================================================================

/// Tunables of the margin computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginParams {
    /// Share of revenue estimated as variable cost.
    pub variable_cost_percent: Percent,
    /// Weeks per month in hundredths; 433 means 4.33.
    pub weeks_per_month_hundredths: u32,
}

impl Default for MarginParams {
    fn default() -> Self {
        MarginParams {
            variable_cost_percent: Percent::from_bps(DEFAULT_VARIABLE_COST_BPS),
            weeks_per_month_hundredths: WEEKS_PER_MONTH_HUNDREDTHS,
        }
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Net margin of a single week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeeklyMargin {
    #[serde(rename = "total_ventas")]
    pub revenue: Money,
    #[serde(rename = "costos_fijos_semanales")]
    pub fixed_costs: Money,
    #[serde(rename = "costos_variables_semanales")]
    pub variable_costs: Money,
    #[serde(rename = "margen_neto")]
    pub net_margin: Money,
    #[serde(rename = "porcentaje_margen")]
    pub margin_percent: f64,
    #[serde(rename = "porcentaje_costos_variables")]
    pub variable_cost_percent: f64,
}

/// Net margin over a run of consecutive weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RangeMargin {
    #[serde(rename = "total_ventas")]
    pub revenue: Money,
    #[serde(rename = "costos_fijos_totales")]
    pub fixed_costs: Money,
    #[serde(rename = "costos_variables_totales")]
    pub variable_costs: Money,
    #[serde(rename = "margen_neto")]
    pub net_margin: Money,
    #[serde(rename = "porcentaje_margen")]
    pub margin_percent: f64,
    #[serde(rename = "num_semanas")]
    pub num_weeks: i64,
    #[serde(rename = "porcentaje_costos_variables")]
    pub variable_cost_percent: f64,
}

/// Sales minus purchases over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BalanceReport {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
    pub total_sales: Money,
    pub total_purchases: Money,
    pub balance: Money,
}

/// Open receivables against open payables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountsSummary {
    pub receivables: Money,
    pub payables: Money,
    /// `receivables - payables`
    pub net_position: Money,
}

// =============================================================================
// Computations
// =============================================================================

/// Portion of the monthly fixed costs attributable to `weeks` weeks.
///
/// ## Example
/// ```rust
/// use bodega_core::accounting::{weekly_fixed_share, MarginParams};
/// use bodega_core::money::Money;
///
/// let share = weekly_fixed_share(Money::from_cents(433_000), 2, &MarginParams::default());
/// assert_eq!(share.cents(), 200_000);
/// ```
pub fn weekly_fixed_share(monthly_fixed: Money, weeks: i64, params: &MarginParams) -> Money {
    monthly_fixed.mul_div_round(100 * weeks, params.weeks_per_month_hundredths as i64)
}

/// `net / revenue × 100`, or 0 when there was no revenue.
pub fn margin_percent(net_margin: Money, revenue: Money) -> f64 {
    if revenue.is_zero() {
        return 0.0;
    }
    net_margin.cents() as f64 / revenue.cents() as f64 * 100.0
}

/// Net margin of one week.
pub fn net_margin_for_week(
    revenue: Money,
    monthly_fixed: Money,
    params: &MarginParams,
) -> WeeklyMargin {
    let fixed_costs = weekly_fixed_share(monthly_fixed, 1, params);
    let variable_costs = revenue.percentage(params.variable_cost_percent);
    let net_margin = revenue - fixed_costs - variable_costs;

    WeeklyMargin {
        revenue,
        fixed_costs,
        variable_costs,
        net_margin,
        margin_percent: margin_percent(net_margin, revenue),
        variable_cost_percent: params.variable_cost_percent.percentage(),
    }
}

/// Net margin of `num_weeks` weeks with combined `revenue`.
///
/// The fixed share is rounded once over the whole range rather than per week.
pub fn net_margin_for_range(
    revenue: Money,
    monthly_fixed: Money,
    num_weeks: i64,
    params: &MarginParams,
) -> RangeMargin {
    let fixed_costs = weekly_fixed_share(monthly_fixed, num_weeks, params);
    let variable_costs = revenue.percentage(params.variable_cost_percent);
    let net_margin = revenue - fixed_costs - variable_costs;

    RangeMargin {
        revenue,
        fixed_costs,
        variable_costs,
        net_margin,
        margin_percent: margin_percent(net_margin, revenue),
        num_weeks,
        variable_cost_percent: params.variable_cost_percent.percentage(),
    }
}

/// Builds the balance record: `sales - purchases`.
pub fn balance(
    start: NaiveDate,
    end: NaiveDate,
    total_sales: Money,
    total_purchases: Money,
) -> BalanceReport {
    BalanceReport {
        start,
        end,
        total_sales,
        total_purchases,
        balance: total_sales - total_purchases,
    }
}

/// Builds the receivables/payables summary.
pub fn accounts_summary(receivables: Money, payables: Money) -> AccountsSummary {
    AccountsSummary {
        receivables,
        payables,
        net_position: receivables - payables,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_week_margin_with_default_params() {
        // Revenue 1000.00, fixed 433.00/month → 100.00/week, variable 300.00
        let report = net_margin_for_week(
            Money::from_cents(100_000),
            Money::from_cents(43_300),
            &MarginParams::default(),
        );
        assert_eq!(report.fixed_costs.cents(), 10_000);
        assert_eq!(report.variable_costs.cents(), 30_000);
        assert_eq!(report.net_margin.cents(), 60_000);
        assert!(approx(report.margin_percent, 60.0));
        assert!(approx(report.variable_cost_percent, 30.0));
    }

    #[test]
    fn test_week_without_sales_carries_fixed_share_only() {
        let report = net_margin_for_week(
            Money::zero(),
            Money::from_cents(100_000),
            &MarginParams::default(),
        );
        assert!(report.variable_costs.is_zero());
        assert_eq!(report.net_margin, -report.fixed_costs);
        assert_eq!(report.fixed_costs.cents(), 23_095);
        assert!(approx(report.margin_percent, 0.0));
    }

    #[test]
    fn test_range_margin_scales_fixed_share_by_weeks() {
        let params = MarginParams::default();
        let report = net_margin_for_range(
            Money::from_cents(300_000),
            Money::from_cents(43_300),
            3,
            &params,
        );
        assert_eq!(report.num_weeks, 3);
        assert_eq!(report.fixed_costs.cents(), 30_000);
        assert_eq!(report.variable_costs.cents(), 90_000);
        assert_eq!(report.net_margin.cents(), 180_000);
        assert!(approx(report.margin_percent, 60.0));
    }

    #[test]
    fn test_custom_params() {
        let params = MarginParams {
            variable_cost_percent: Percent::from_bps(1000),
            weeks_per_month_hundredths: 400,
        };
        let report = net_margin_for_week(
            Money::from_cents(10_000),
            Money::from_cents(40_000),
            &params,
        );
        assert_eq!(report.fixed_costs.cents(), 10_000);
        assert_eq!(report.variable_costs.cents(), 1_000);
        assert_eq!(report.net_margin.cents(), -1_000);
        assert!(approx(report.margin_percent, -10.0));
    }

    #[test]
    fn test_margin_is_deterministic() {
        let params = MarginParams::default();
        let a = net_margin_for_week(Money::from_cents(12_345), Money::from_cents(99_999), &params);
        let b = net_margin_for_week(Money::from_cents(12_345), Money::from_cents(99_999), &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_report_serializes_with_report_column_names() {
        let report = net_margin_for_week(
            Money::from_cents(100_000),
            Money::from_cents(43_300),
            &MarginParams::default(),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_ventas"], 100_000);
        assert_eq!(json["costos_fijos_semanales"], 10_000);
        assert_eq!(json["costos_variables_semanales"], 30_000);
        assert_eq!(json["margen_neto"], 60_000);
        assert_eq!(json["porcentaje_costos_variables"], 30.0);

        let range = net_margin_for_range(Money::zero(), Money::zero(), 2, &MarginParams::default());
        let json = serde_json::to_value(&range).unwrap();
        assert_eq!(json["num_semanas"], 2);
        assert!(json.get("costos_fijos_totales").is_some());
    }

    #[test]
    fn test_balance_and_accounts_summary() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let report = balance(start, end, Money::from_cents(5_000), Money::from_cents(7_500));
        assert_eq!(report.balance.cents(), -2_500);

        let summary = accounts_summary(Money::from_cents(900), Money::from_cents(400));
        assert_eq!(summary.net_position.cents(), 500);
    }
}
