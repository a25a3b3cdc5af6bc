//! # Cost Repository
//!
//! Fixed and variable operating costs.
//!
//! Fixed costs are monthly amounts; the accounting aggregator spreads their
//! total over weeks. Variable costs are recorded for reference, while the
//! margin report estimates them as a share of revenue.

use sqlx::SqlitePool;
use tracing::{debug, info};

use bodega_core::validation::{validate_name, validate_positive_amount};
use bodega_core::{Cost, CostKind, Money};

use crate::error::{DbError, DbResult};

/// Repository for cost database operations.
#[derive(Debug, Clone)]
pub struct CostRepository {
    pool: SqlitePool,
}

impl CostRepository {
    /// Creates a new CostRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CostRepository { pool }
    }

    /// All costs, ordered by kind then name.
    pub async fn get_all(&self) -> DbResult<Vec<Cost>> {
        let costs = sqlx::query_as::<_, Cost>(
            r#"
            SELECT id, nombre AS name, cantidad AS amount_cents, tipo AS kind
            FROM costos
            ORDER BY tipo, nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(costs)
    }

    /// Costs of one kind, ordered by name.
    pub async fn get_by_kind(&self, kind: CostKind) -> DbResult<Vec<Cost>> {
        let costs = sqlx::query_as::<_, Cost>(
            r#"
            SELECT id, nombre AS name, cantidad AS amount_cents, tipo AS kind
            FROM costos
            WHERE tipo = ?1
            ORDER BY nombre
            "#,
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(costs)
    }

    /// Gets a cost by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Cost>> {
        let cost = sqlx::query_as::<_, Cost>(
            "SELECT id, nombre AS name, cantidad AS amount_cents, tipo AS kind FROM costos WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cost)
    }

    /// Inserts (no id) or updates (id set) a cost.
    ///
    /// ## Returns
    /// * `Err(Validation)` - Blank name or non-positive amount
    /// * `Err(NotFound)` - Updating an id that doesn't exist
    pub async fn save(&self, cost: &Cost) -> DbResult<Cost> {
        let name = validate_name("name", &cost.name)?;
        validate_positive_amount("amount", cost.amount())?;

        let mut stored = cost.clone();
        stored.name = name;

        match stored.id {
            None => {
                let result =
                    sqlx::query("INSERT INTO costos (nombre, cantidad, tipo) VALUES (?1, ?2, ?3)")
                        .bind(&stored.name)
                        .bind(stored.amount_cents)
                        .bind(stored.kind)
                        .execute(&self.pool)
                        .await?;
                stored.id = Some(result.last_insert_rowid());
                info!(id = ?stored.id, kind = %stored.kind, amount = %stored.amount(), "Cost recorded");
            }
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE costos SET nombre = ?2, cantidad = ?3, tipo = ?4 WHERE id = ?1",
                )
                .bind(id)
                .bind(&stored.name)
                .bind(stored.amount_cents)
                .bind(stored.kind)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Cost", id));
                }
                debug!(id, "Cost updated");
            }
        }

        Ok(stored)
    }

    /// Deletes a cost.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM costos WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cost", id));
        }
        info!(id, "Cost deleted");
        Ok(())
    }

    /// Sum of all costs of one kind; zero when there are none.
    pub async fn total_by_kind(&self, kind: CostKind) -> DbResult<Money> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(cantidad), 0) FROM costos WHERE tipo = ?1")
                .bind(kind)
                .fetch_one(&self.pool)
                .await?;
        Ok(Money::from_cents(total))
    }

    /// Sum of every cost; zero when there are none.
    pub async fn total(&self) -> DbResult<Money> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(cantidad), 0) FROM costos")
            .fetch_one(&self.pool)
            .await?;
        Ok(Money::from_cents(total))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
