//! # Purchase Repository
//!
//! Supplier purchases. Product names are free text and never touch catalog
//! stock; the accounting aggregator reads this log for balances and losses.
//!
//! `costo_unitario` and `perdidas` are generated columns in the schema, so
//! the repository only ever writes the four inputs.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use bodega_core::validation::{
    validate_name, validate_non_negative_quantity, validate_positive_amount,
    validate_positive_quantity,
};
use bodega_core::Purchase;

use crate::error::{DbError, DbResult};

const SELECT_PURCHASE: &str = r#"
    SELECT
        id,
        producto_nombre AS product_name,
        costo_total AS total_cost_cents,
        cantidad_elementos AS item_count,
        merma AS spoilage_count,
        fecha_compra AS purchase_date
    FROM compras
"#;

/// Repository for the purchase log.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// All purchases, newest date first; same-day purchases newest id first.
    pub async fn get_all(&self) -> DbResult<Vec<Purchase>> {
        let sql = format!("{SELECT_PURCHASE} ORDER BY fecha_compra DESC, id DESC");
        let purchases = sqlx::query_as::<_, Purchase>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(purchases)
    }

    /// Gets a purchase by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Purchase>> {
        let sql = format!("{SELECT_PURCHASE} WHERE id = ?1");
        let purchase = sqlx::query_as::<_, Purchase>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(purchase)
    }

    /// Inserts (no id) or updates (id set) a purchase.
    ///
    /// ## Returns
    /// * `Err(Validation)` - Blank name, non-positive cost or item count,
    ///   negative spoilage
    /// * `Err(NotFound)` - Updating an id that doesn't exist
    pub async fn save(&self, purchase: &Purchase) -> DbResult<Purchase> {
        let name = validate_name("product_name", &purchase.product_name)?;
        validate_positive_amount("total_cost", purchase.total_cost())?;
        validate_positive_quantity("item_count", purchase.item_count)?;
        validate_non_negative_quantity("spoilage_count", purchase.spoilage_count)?;

        if purchase.spoilage_count > purchase.item_count {
            warn!(
                product = %name,
                items = purchase.item_count,
                spoilage = purchase.spoilage_count,
                "Spoilage exceeds purchased items"
            );
        }

        let mut stored = purchase.clone();
        stored.product_name = name;

        match stored.id {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO compras (
                        producto_nombre, costo_total, cantidad_elementos, merma, fecha_compra
                    ) VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(&stored.product_name)
                .bind(stored.total_cost_cents)
                .bind(stored.item_count)
                .bind(stored.spoilage_count)
                .bind(stored.purchase_date)
                .execute(&self.pool)
                .await?;

                stored.id = Some(result.last_insert_rowid());
                info!(
                    id = ?stored.id,
                    product = %stored.product_name,
                    total = %stored.total_cost(),
                    date = %stored.purchase_date,
                    "Purchase recorded"
                );
            }
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE compras SET
                        producto_nombre = ?2,
                        costo_total = ?3,
                        cantidad_elementos = ?4,
                        merma = ?5,
                        fecha_compra = ?6
                    WHERE id = ?1
                    "#,
                )
                .bind(id)
                .bind(&stored.product_name)
                .bind(stored.total_cost_cents)
                .bind(stored.item_count)
                .bind(stored.spoilage_count)
                .bind(stored.purchase_date)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Purchase", id));
                }
                debug!(id, "Purchase updated");
            }
        }

        Ok(stored)
    }

    /// Deletes a purchase.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM compras WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", id));
        }
        info!(id, "Purchase deleted");
        Ok(())
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
    use bodega_core::Money;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_save_round_trip_defaults_spoilage() {
        let db = setup().await;
        let saved = db
            .purchases()
            .save(&Purchase::new("  Leche  ", Money::from_cents(1_200), 12, date(2024, 3, 4)))
            .await
            .unwrap();
        assert_eq!(saved.product_name, "Leche");
        assert_eq!(saved.spoilage_count, 0);

        let fetched = db
            .purchases()
            .get_by_id(saved.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, saved);
        assert_eq!(fetched.unit_cost().cents(), 100);
        assert!(fetched.loss_value().is_zero());
    }

    #[tokio::test]
    async fn test_validation() {
        let db = setup().await;
        let repo = db.purchases();

        let cases = [
            Purchase::new("", Money::from_cents(100), 1, date(2024, 1, 1)),
            Purchase::new("Huevos", Money::zero(), 1, date(2024, 1, 1)),
            Purchase::new("Huevos", Money::from_cents(100), 0, date(2024, 1, 1)),
            Purchase::new("Huevos", Money::from_cents(100), 1, date(2024, 1, 1)).with_spoilage(-1),
        ];
        for purchase in cases {
            let err = repo.save(&purchase).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{purchase:?}");
        }
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spoilage_above_items_is_accepted() {
        let db = setup().await;
        let saved = db
            .purchases()
            .save(
                &Purchase::new("Tomates", Money::from_cents(1_000), 10, date(2024, 2, 1))
                    .with_spoilage(12),
            )
            .await
            .unwrap();
        assert_eq!(saved.loss_value().cents(), 1_200);
    }

    #[tokio::test]
    async fn test_ordering_update_and_delete() {
        let db = setup().await;
        let repo = db.purchases();
        let older = repo
            .save(&Purchase::new("Arroz", Money::from_cents(500), 5, date(2024, 1, 1)))
            .await
            .unwrap();
        let first = repo
            .save(&Purchase::new("Pan", Money::from_cents(300), 3, date(2024, 1, 9)))
            .await
            .unwrap();
        let second = repo
            .save(&Purchase::new("Café", Money::from_cents(900), 1, date(2024, 1, 9)))
            .await
            .unwrap();

        let ids: Vec<Option<i64>> = repo.get_all().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id, older.id]);

        let mut edited = older.clone();
        edited.spoilage_count = 2;
        repo.save(&edited).await.unwrap();
        let fetched = repo.get_by_id(older.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(fetched.loss_value().cents(), 200);

        repo.delete(older.id.unwrap()).await.unwrap();
        let err = repo.delete(older.id.unwrap()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
