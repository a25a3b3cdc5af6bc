//! # Sale Repository (Sales Ledger)
//!
//! Sales and product stock move together. Every write runs in one
//! [`UnitOfWork`], so a sale row never exists without its stock movement and
//! stock never moves without its sale row.
//!
//! ## Ledger State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            create(sale)                     delete(id)                  │
//! │  (none) ───────────────────► RECORDED ──────────────────► (none)        │
//! │         stock -= qty            │  ▲     stock += stored qty            │
//! │         requires stock >= qty   │  │                                    │
//! │                                 └──┘                                    │
//! │                         update(sale, previous_qty)                      │
//! │                         delta = qty - previous_qty                      │
//! │                         stock -= delta (delta > 0 needs stock >= delta) │
//! │                                                                         │
//! │  Invariant: stock + Σ quantity_sold is constant per product across      │
//! │  ledger operations.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Validation Order
//! 1. Field rules (`quantity_sold > 0`, `amount > 0`) - no storage touched
//! 2. Referenced week and product exist - read only
//! 3. Stock sufficiency - read only
//! 4. Writes, then commit

use sqlx::SqlitePool;
use tracing::{debug, info};

use bodega_core::validation::{
    ensure_stock, validate_positive_amount, validate_positive_quantity,
};
use bodega_core::{Money, Sale, ValidationError};

use crate::error::{DbError, DbResult};
use crate::unit_of_work::UnitOfWork;

const SELECT_SALE: &str = r#"
    SELECT
        id,
        semana_id AS week_id,
        producto_id AS product_id,
        cantidad_vendida AS quantity_sold,
        monto AS amount_cents
    FROM ventas
"#;

/// Repository for the sales ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Ledger writes
    // =========================================================================

    /// Records a new sale and debits the product's stock.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - The stored sale with its id
    /// * `Err(Validation)` - Non-positive quantity or amount
    /// * `Err(NotFound)` - Unknown week or product
    /// * `Err(InsufficientStock)` - Fewer units on hand than sold
    pub async fn create(&self, sale: &Sale) -> DbResult<Sale> {
        validate_sale(sale)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        ensure_week(&mut uow, sale.week_id).await?;

        let available = uow.product_stock(sale.product_id).await?;
        ensure_stock(sale.product_id, available, sale.quantity_sold)?;

        let id = uow.insert_sale(sale).await?;
        uow.set_stock(sale.product_id, available - sale.quantity_sold)
            .await?;
        uow.commit().await?;

        info!(
            sale_id = id,
            week_id = sale.week_id,
            product_id = sale.product_id,
            quantity = sale.quantity_sold,
            amount = %sale.amount(),
            "Sale recorded"
        );

        Ok(Sale {
            id: Some(id),
            ..sale.clone()
        })
    }

    /// Rewrites a recorded sale and adjusts stock by the quantity change.
    ///
    /// `previous_quantity` is the quantity the caller last saw for this sale;
    /// it must match the stored row.
    ///
    /// If the sale moves to a different product, the old product gets
    /// `previous_quantity` back and the new product is debited the full new
    /// quantity, both in the same unit of work.
    ///
    /// ## Returns
    /// * `Err(Validation)` - Field rules, missing id, or stale `previous_quantity`
    /// * `Err(NotFound)` - Unknown sale, week or product
    /// * `Err(InsufficientStock)` - Not enough stock for the increase
    pub async fn update(&self, sale: &Sale, previous_quantity: i64) -> DbResult<Sale> {
        let sale_id = sale.id.ok_or_else(|| ValidationError::Required {
            field: "sale id".to_string(),
        })?;
        validate_sale(sale)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let stored = uow
            .sale(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        if stored.quantity_sold != previous_quantity {
            return Err(ValidationError::Stale {
                field: "previous quantity".to_string(),
                expected: stored.quantity_sold,
                actual: previous_quantity,
            }
            .into());
        }
        ensure_week(&mut uow, sale.week_id).await?;

        if stored.product_id == sale.product_id {
            let available = uow.product_stock(sale.product_id).await?;
            let delta = sale.quantity_sold - previous_quantity;
            ensure_stock(sale.product_id, available, delta)?;
            if delta != 0 {
                uow.set_stock(sale.product_id, available - delta).await?;
            }
            debug!(sale_id, delta, "Adjusted stock for sale update");
        } else {
            let new_available = uow.product_stock(sale.product_id).await?;
            ensure_stock(sale.product_id, new_available, sale.quantity_sold)?;

            let old_available = uow.product_stock(stored.product_id).await?;
            uow.set_stock(stored.product_id, old_available + previous_quantity)
                .await?;
            uow.set_stock(sale.product_id, new_available - sale.quantity_sold)
                .await?;
            debug!(
                sale_id,
                from_product = stored.product_id,
                to_product = sale.product_id,
                "Moved sale between products"
            );
        }

        uow.update_sale(sale_id, sale).await?;
        uow.commit().await?;

        info!(
            sale_id,
            quantity = sale.quantity_sold,
            previous_quantity,
            "Sale updated"
        );
        Ok(sale.clone())
    }

    /// Deletes a sale and credits its full quantity back to the product.
    pub async fn delete(&self, sale_id: i64) -> DbResult<()> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let stored = uow
            .sale(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        let available = uow.product_stock(stored.product_id).await?;
        uow.set_stock(stored.product_id, available + stored.quantity_sold)
            .await?;
        uow.delete_sale(sale_id).await?;
        uow.commit().await?;

        info!(
            sale_id,
            product_id = stored.product_id,
            restored = stored.quantity_sold,
            "Sale deleted"
        );
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All sales, latest week first, then by product.
    pub async fn get_all(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("{SELECT_SALE} ORDER BY semana_id DESC, producto_id");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sql = format!("{SELECT_SALE} WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    /// Sales of one week, by product.
    pub async fn get_by_week(&self, week_id: i64) -> DbResult<Vec<Sale>> {
        let sql = format!("{SELECT_SALE} WHERE semana_id = ?1 ORDER BY producto_id");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(week_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Sales of one product, latest week first.
    pub async fn get_by_product(&self, product_id: i64) -> DbResult<Vec<Sale>> {
        let sql = format!("{SELECT_SALE} WHERE producto_id = ?1 ORDER BY semana_id DESC");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Revenue of one week; zero when it has no sales.
    pub async fn total_amount_for_week(&self, week_id: i64) -> DbResult<Money> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(monto), 0) FROM ventas WHERE semana_id = ?1")
                .bind(week_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(Money::from_cents(total))
    }

    /// Units of one product sold across all weeks; 0 when never sold.
    pub async fn total_quantity_for_product(&self, product_id: i64) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(cantidad_vendida), 0) FROM ventas WHERE producto_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

fn validate_sale(sale: &Sale) -> DbResult<()> {
    validate_positive_quantity("quantity_sold", sale.quantity_sold)?;
    validate_positive_amount("amount", sale.amount())?;
    Ok(())
}

async fn ensure_week(uow: &mut UnitOfWork, week_id: i64) -> DbResult<()> {
    if !uow.week_exists(week_id).await? {
        return Err(DbError::not_found("Week", week_id));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
