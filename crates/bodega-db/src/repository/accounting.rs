//! # Accounting Repository
//!
//! Read-only aggregation over the ledgers. This module only gathers sums
//! from storage; the margin arithmetic lives in [`bodega_core::accounting`].
//!
//! ## Data Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  balance(start, end)                                                    │
//! │     ├── ventas ⋈ semanas   week counts when fecha_inicio ∈ [start, end] │
//! │     └── compras            fecha_compra ∈ [start, end]                  │
//! │                                                                         │
//! │  net_margin_for_week(id) / net_margin_for_range(first_id, last_id)      │
//! │     ├── ventas             revenue of the selected weeks                │
//! │     ├── costos (fijo)      monthly fixed total                          │
//! │     └── LedgerConfig       variable %, weeks per month                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use bodega_core::accounting::{self, AccountsSummary, BalanceReport, RangeMargin, WeeklyMargin};
use bodega_core::period::validate_period;
use bodega_core::{CostKind, Money};

use crate::config::LedgerConfig;
use crate::error::{DbError, DbResult};

/// Aggregator for balances, margins and totals.
#[derive(Debug, Clone)]
pub struct AccountingRepository {
    pool: SqlitePool,
    config: LedgerConfig,
}

impl AccountingRepository {
    /// Creates an aggregator with the given margin settings.
    pub fn new(pool: SqlitePool, config: LedgerConfig) -> Self {
        AccountingRepository { pool, config }
    }

    /// The settings used for margin reports.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // =========================================================================
    // Date-range totals
    // =========================================================================

    /// Sum of purchase costs with `purchase_date` in `[start, end]`.
    pub async fn total_purchases_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Money> {
        validate_period("range", start, end)?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(costo_total), 0) FROM compras WHERE fecha_compra BETWEEN ?1 AND ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        debug!(start = %start, end = %end, total, "Purchases in range");
        Ok(Money::from_cents(total))
    }

    /// Sum of sales in weeks that start within `[start, end]`.
    pub async fn total_sales_in_range(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Money> {
        validate_period("range", start, end)?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(v.monto), 0)
            FROM ventas v
            JOIN semanas s ON s.id = v.semana_id
            WHERE s.fecha_inicio BETWEEN ?1 AND ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        debug!(start = %start, end = %end, total, "Sales in range");
        Ok(Money::from_cents(total))
    }

    /// Sales minus purchases over `[start, end]`.
    pub async fn balance(&self, start: NaiveDate, end: NaiveDate) -> DbResult<BalanceReport> {
        let sales = self.total_sales_in_range(start, end).await?;
        let purchases = self.total_purchases_in_range(start, end).await?;
        Ok(accounting::balance(start, end, sales, purchases))
    }

    /// Value of spoiled items for purchases in `[start, end]`, to the cent.
    pub async fn total_losses_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Money> {
        validate_period("range", start, end)?;

        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(perdidas), 0.0) FROM compras WHERE fecha_compra BETWEEN ?1 AND ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(total.round() as i64))
    }

    // =========================================================================
    // Margins
    // =========================================================================

    /// Net margin of one week.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - Unknown week
    pub async fn net_margin_for_week(&self, week_id: i64) -> DbResult<WeeklyMargin> {
        self.week_start(week_id).await?;

        let revenue: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(monto), 0) FROM ventas WHERE semana_id = ?1")
                .bind(week_id)
                .fetch_one(&self.pool)
                .await?;
        let fixed = self.monthly_fixed_costs().await?;

        let report = accounting::net_margin_for_week(
            Money::from_cents(revenue),
            fixed,
            &self.config.margin_params(),
        );
        debug!(week_id, net = %report.net_margin, "Weekly margin computed");
        Ok(report)
    }

    /// Net margin of every week from `start_week_id` through `end_week_id`.
    ///
    /// Weeks are taken in date order: every week whose start date lies
    /// between the two boundary weeks' start dates, both included.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - Either boundary week is unknown
    /// * `Err(Validation)` - The start week begins after the end week
    pub async fn net_margin_for_range(
        &self,
        start_week_id: i64,
        end_week_id: i64,
    ) -> DbResult<RangeMargin> {
        let first = self.week_start(start_week_id).await?;
        let last = self.week_start(end_week_id).await?;
        validate_period("week range", first, last)?;

        let (num_weeks, revenue): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM((SELECT COALESCE(SUM(v.monto), 0) FROM ventas v WHERE v.semana_id = s.id)), 0)
            FROM semanas s
            WHERE s.fecha_inicio BETWEEN ?1 AND ?2
            "#,
        )
        .bind(first)
        .bind(last)
        .fetch_one(&self.pool)
        .await?;
        let fixed = self.monthly_fixed_costs().await?;

        let report = accounting::net_margin_for_range(
            Money::from_cents(revenue),
            fixed,
            num_weeks,
            &self.config.margin_params(),
        );
        debug!(
            start_week_id,
            end_week_id,
            num_weeks,
            net = %report.net_margin,
            "Range margin computed"
        );
        Ok(report)
    }

    // =========================================================================
    // Receivables / payables
    // =========================================================================

    /// Receivable total, payable total, and their difference.
    pub async fn accounts_summary(&self) -> DbResult<AccountsSummary> {
        let receivables: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(cantidad), 0) FROM cuentas_cobrar")
                .fetch_one(&self.pool)
                .await?;
        let payables: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(cantidad), 0) FROM cuentas_pagar")
                .fetch_one(&self.pool)
                .await?;

        Ok(accounting::accounts_summary(
            Money::from_cents(receivables),
            Money::from_cents(payables),
        ))
    }

    async fn week_start(&self, week_id: i64) -> DbResult<NaiveDate> {
        let start: Option<NaiveDate> =
            sqlx::query_scalar("SELECT fecha_inicio FROM semanas WHERE id = ?1")
                .bind(week_id)
                .fetch_optional(&self.pool)
                .await?;
        start.ok_or_else(|| DbError::not_found("Week", week_id))
    }

    async fn monthly_fixed_costs(&self) -> DbResult<Money> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(cantidad), 0) FROM costos WHERE tipo = ?1")
                .bind(CostKind::Fixed)
                .fetch_one(&self.pool)
                .await?;
        Ok(Money::from_cents(total))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::{Database, DbConfig};
    use bodega_core::{AccountEntry, Category, Cost, Percent, Product, Purchase, Sale, Week};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        db: Database,
        weeks: Vec<i64>,
        product_id: i64,
    }

    /// Three consecutive January 2024 weeks and a product with 100 units.
    async fn setup(config: DbConfig) -> Fixture {
        let db = Database::new(config).await.unwrap();
        let cat = db
            .categories()
            .save(&Category::new("Bebidas"))
            .await
            .unwrap()
            .id
            .unwrap();
        let product_id = db
            .products()
            .save(&Product::new(
                "Refresco",
                cat,
                Money::from_cents(500),
                Money::from_cents(1_000),
                100,
            ))
            .await
            .unwrap()
            .id
            .unwrap();

        let mut weeks = Vec::new();
        for (start, end) in [(1, 7), (8, 14), (15, 21)] {
            let week = db
                .weeks()
                .save(&Week::new(date(2024, 1, start), date(2024, 1, end)))
                .await
                .unwrap();
            weeks.push(week.id.unwrap());
        }

        Fixture {
            db,
            weeks,
            product_id,
        }
    }

    async fn sell(f: &Fixture, week: usize, qty: i64, cents: i64) {
        f.db.sales()
            .create(&Sale::new(f.weeks[week], f.product_id, qty, Money::from_cents(cents)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_week_margin() {
        let f = setup(DbConfig::in_memory()).await;
        f.db.costs()
            .save(&Cost::new("Alquiler", Money::from_cents(43_300), CostKind::Fixed))
            .await
            .unwrap();
        f.db.costs()
            .save(&Cost::new("Bolsas", Money::from_cents(9_999), CostKind::Variable))
            .await
            .unwrap();
        sell(&f, 0, 10, 100_000).await;

        let report = f.db.accounting().net_margin_for_week(f.weeks[0]).await.unwrap();
        assert_eq!(report.revenue.cents(), 100_000);
        assert_eq!(report.fixed_costs.cents(), 10_000);
        assert_eq!(report.variable_costs.cents(), 30_000);
        assert_eq!(report.net_margin.cents(), 60_000);
        assert!((report.margin_percent - 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_week_margin_uses_configured_percent() {
        let config = DbConfig::in_memory().ledger(
            LedgerConfig::default().variable_cost_percent(Percent::from_bps(1_000)),
        );
        let f = setup(config).await;
        sell(&f, 1, 2, 20_000).await;

        let report = f.db.accounting().net_margin_for_week(f.weeks[1]).await.unwrap();
        assert_eq!(report.variable_costs.cents(), 2_000);
        assert_eq!(report.net_margin.cents(), 18_000);
        assert!((report.variable_cost_percent - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_week_margin_unknown_week() {
        let f = setup(DbConfig::in_memory()).await;
        let err = f.db.accounting().net_margin_for_week(404).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_range_margin() {
        let f = setup(DbConfig::in_memory()).await;
        f.db.costs()
            .save(&Cost::new("Alquiler", Money::from_cents(43_300), CostKind::Fixed))
            .await
            .unwrap();
        sell(&f, 0, 1, 10_000).await;
        sell(&f, 1, 2, 20_000).await;
        sell(&f, 2, 3, 30_000).await;

        let accounting = f.db.accounting();
        let report = accounting
            .net_margin_for_range(f.weeks[0], f.weeks[1])
            .await
            .unwrap();
        assert_eq!(report.num_weeks, 2);
        assert_eq!(report.revenue.cents(), 30_000);
        assert_eq!(report.fixed_costs.cents(), 20_000);
        assert_eq!(report.variable_costs.cents(), 9_000);
        assert_eq!(report.net_margin.cents(), 1_000);

        let all = accounting
            .net_margin_for_range(f.weeks[0], f.weeks[2])
            .await
            .unwrap();
        assert_eq!(all.num_weeks, 3);
        assert_eq!(all.revenue.cents(), 60_000);

        let err = accounting
            .net_margin_for_range(f.weeks[2], f.weeks[0])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_balance_and_losses() {
        let f = setup(DbConfig::in_memory()).await;
        sell(&f, 0, 5, 5_000).await;
        sell(&f, 2, 1, 1_000).await;
        f.db.purchases()
            .save(
                &Purchase::new("Refresco", Money::from_cents(1_000), 3, date(2024, 1, 3))
                    .with_spoilage(1),
            )
            .await
            .unwrap();
        f.db.purchases()
            .save(&Purchase::new("Hielo", Money::from_cents(700), 7, date(2024, 2, 1)))
            .await
            .unwrap();

        let accounting = f.db.accounting();
        let report = accounting
            .balance(date(2024, 1, 1), date(2024, 1, 14))
            .await
            .unwrap();
        assert_eq!(report.total_sales.cents(), 5_000);
        assert_eq!(report.total_purchases.cents(), 1_000);
        assert_eq!(report.balance.cents(), 4_000);

        let losses = accounting
            .total_losses_in_range(date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(losses.cents(), 333);

        let err = accounting
            .balance(date(2024, 2, 1), date(2024, 1, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_accounts_summary() {
        let f = setup(DbConfig::in_memory()).await;
        f.db.receivables()
            .save(&AccountEntry::new("Vecino", Money::from_cents(1_500)))
            .await
            .unwrap();
        f.db.payables()
            .save(&AccountEntry::new("Proveedor", Money::from_cents(4_000)))
            .await
            .unwrap();

        let summary = f.db.accounting().accounts_summary().await.unwrap();
        assert_eq!(summary.receivables.cents(), 1_500);
        assert_eq!(summary.payables.cents(), 4_000);
        assert_eq!(summary.net_position.cents(), -2_500);
    }
}
