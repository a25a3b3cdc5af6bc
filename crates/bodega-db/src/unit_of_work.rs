//! # Unit of Work
//!
//! One pooled connection plus one open transaction, scoped to a single
//! ledger operation.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UnitOfWork::begin(pool)   ← acquires a connection, BEGIN               │
//! │       │                                                                 │
//! │       ├── reads  (stock, stored sale, existence checks)                 │
//! │       ├── writes (sale row + product stock)                             │
//! │       │                                                                 │
//! │       ├── uow.commit()     ← COMMIT, connection back to the pool        │
//! │       │                                                                 │
//! │       └── early return / `?` / panic                                    │
//! │             └── drop       ← ROLLBACK, connection back to the pool      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every read inside a ledger operation goes through the unit of work, never
//! through the pool: with a single-connection pool (in-memory databases) a
//! pool read would wait on the connection this unit already holds.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use bodega_core::Sale;

use crate::error::{DbError, DbResult};

/// A scoped transaction over the sales and products tables.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Acquires a connection and opens a transaction.
    pub async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool.begin().await?;
        debug!("Unit of work started");
        Ok(UnitOfWork { tx })
    }

    /// The underlying connection, for statements not covered below.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Commits every statement issued through this unit.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Discards every statement issued through this unit.
    ///
    /// Dropping the unit has the same effect; this just makes it explicit.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work rolled back");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current stock of a product. `NotFound` if the product doesn't exist.
    pub async fn product_stock(&mut self, product_id: i64) -> DbResult<i64> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT cantidad FROM productos WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        stock.ok_or_else(|| DbError::not_found("Product", product_id))
    }

    /// Whether a week with this id exists.
    pub async fn week_exists(&mut self, week_id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM semanas WHERE id = ?1")
            .bind(week_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(found.is_some())
    }

    /// The stored sale row, if any.
    pub async fn sale(&mut self, sale_id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id,
                semana_id AS week_id,
                producto_id AS product_id,
                cantidad_vendida AS quantity_sold,
                monto AS amount_cents
            FROM ventas
            WHERE id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(sale)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Sets a product's stock to an absolute value and refreshes its margin.
    pub async fn set_stock(&mut self, product_id: i64, quantity: i64) -> DbResult<()> {
        debug!(product_id, quantity, "Setting stock");

        let result = sqlx::query(
            r#"
            UPDATE productos
            SET cantidad = ?2,
                margen_bruto = precio_venta - costo
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }
        Ok(())
    }

    /// Inserts a sale row and returns its id.
    pub async fn insert_sale(&mut self, sale: &Sale) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO ventas (semana_id, producto_id, cantidad_vendida, monto)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(sale.week_id)
        .bind(sale.product_id)
        .bind(sale.quantity_sold)
        .bind(sale.amount_cents)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrites a sale row.
    pub async fn update_sale(&mut self, sale_id: i64, sale: &Sale) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE ventas
            SET semana_id = ?2,
                producto_id = ?3,
                cantidad_vendida = ?4,
                monto = ?5
            WHERE id = ?1
            "#,
        )
        .bind(sale_id)
        .bind(sale.week_id)
        .bind(sale.product_id)
        .bind(sale.quantity_sold)
        .bind(sale.amount_cents)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale_id));
        }
        Ok(())
    }

    /// Deletes a sale row.
    pub async fn delete_sale(&mut self, sale_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM ventas WHERE id = ?1")
            .bind(sale_id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale_id));
        }
        Ok(())
    }
}
