//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Save (insert or update) with margin recomputation
//! - Lookups by id, by category, grouped by category
//! - Delete (cascades to the product's sales)
//!
//! ## Stock Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  productos.cantidad is written by two paths only:                       │
//! │                                                                         │
//! │   1. ProductRepository::save   ← manual stock count from the catalog    │
//! │   2. SaleRepository (ledger)   ← debit/credit inside a UnitOfWork       │
//! │                                                                         │
//! │  Both keep cantidad >= 0; the CHECK constraint backs them up.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use bodega_core::validation::{
    validate_name, validate_non_negative_amount, validate_non_negative_quantity,
};
use bodega_core::{Category, CategoryGroup, Product};

use crate::error::{DbError, DbResult};

const SELECT_PRODUCT: &str = r#"
    SELECT
        id,
        nombre AS name,
        categoria_id AS category_id,
        costo AS cost_cents,
        precio_venta AS sale_price_cents,
        cantidad AS quantity,
        margen_bruto AS gross_margin_cents
    FROM productos
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let saved = repo.save(&Product::new("Arroz", cat_id, cost, price, 10)).await?;
/// let grouped = repo.get_grouped_by_category().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products, ordered by name.
    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} ORDER BY nombre");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Products of one category, ordered by name.
    pub async fn get_by_category(&self, category_id: i64) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE categoria_id = ?1 ORDER BY nombre");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Categories that have products, each with its products.
    ///
    /// Groups are sorted by category name; products keep name order.
    pub async fn get_grouped_by_category(&self) -> DbResult<Vec<CategoryGroup>> {
        let products = self.get_all().await?;

        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, nombre AS name FROM categorias ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_category: HashMap<i64, Vec<Product>> = HashMap::new();
        for product in products {
            by_category
                .entry(product.category_id)
                .or_default()
                .push(product);
        }

        let groups: Vec<CategoryGroup> = categories
            .into_iter()
            .filter_map(|category| {
                let products = by_category.remove(&category.id?)?;
                Some(CategoryGroup { category, products })
            })
            .collect();

        debug!(groups = groups.len(), "Grouped products by category");
        Ok(groups)
    }

    /// Inserts (no id) or updates (id set) a product.
    ///
    /// `gross_margin` is recomputed from cost and price before writing,
    /// whatever the caller put in it.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product
    /// * `Err(Validation)` - Blank name, negative cost/price/quantity
    /// * `Err(NotFound)` - Unknown category, or unknown id on update
    pub async fn save(&self, product: &Product) -> DbResult<Product> {
        let name = validate_name("name", &product.name)?;
        validate_non_negative_amount("cost", product.cost())?;
        validate_non_negative_amount("sale_price", product.sale_price())?;
        validate_non_negative_quantity("quantity", product.quantity)?;

        let category_exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM categorias WHERE id = ?1")
                .bind(product.category_id)
                .fetch_optional(&self.pool)
                .await?;
        if category_exists.is_none() {
            return Err(DbError::not_found("Category", product.category_id));
        }

        let mut stored = product.clone();
        stored.name = name;
        stored.recompute_margin();

        match stored.id {
            None => {
                debug!(name = %stored.name, "Inserting product");

                let result = sqlx::query(
                    r#"
                    INSERT INTO productos (
                        nombre, categoria_id, costo, precio_venta, cantidad, margen_bruto
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(&stored.name)
                .bind(stored.category_id)
                .bind(stored.cost_cents)
                .bind(stored.sale_price_cents)
                .bind(stored.quantity)
                .bind(stored.gross_margin_cents)
                .execute(&self.pool)
                .await?;

                stored.id = Some(result.last_insert_rowid());
            }
            Some(id) => {
                debug!(id, name = %stored.name, "Updating product");

                let result = sqlx::query(
                    r#"
                    UPDATE productos SET
                        nombre = ?2,
                        categoria_id = ?3,
                        costo = ?4,
                        precio_venta = ?5,
                        cantidad = ?6,
                        margen_bruto = ?7
                    WHERE id = ?1
                    "#,
                )
                .bind(id)
                .bind(&stored.name)
                .bind(stored.category_id)
                .bind(stored.cost_cents)
                .bind(stored.sale_price_cents)
                .bind(stored.quantity)
                .bind(stored.gross_margin_cents)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Product", id));
                }
            }
        }

        Ok(stored)
    }

    /// Deletes a product. Its sales are removed by the schema cascade.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ventas WHERE producto_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM productos WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        if sales > 0 {
            warn!(id, discarded_sales = sales, "Product deleted together with its sales");
        } else {
            info!(id, "Product deleted");
        }
        Ok(())
    }

    /// Units of this product sold across all weeks; 0 when never sold.
    pub async fn total_sold(&self, id: i64) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(cantidad_vendida), 0) FROM ventas WHERE producto_id = ?1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
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

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = db
            .categories()
            .save(&Category::new("Abarrotes"))
            .await
            .unwrap();
        (db, cat.id.unwrap())
    }

    fn product(category_id: i64, name: &str) -> Product {
        Product::new(name, category_id, Money::from_cents(120), Money::from_cents(200), 10)
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let (db, cat) = setup().await;
        let saved = db.products().save(&product(cat, "Arroz")).await.unwrap();
        let id = saved.id.unwrap();

        let fetched = db.products().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched, saved);
        assert_eq!(fetched.gross_margin().cents(), 80);
    }

    #[tokio::test]
    async fn test_save_recomputes_margin_on_update() {
        let (db, cat) = setup().await;
        let mut saved = db.products().save(&product(cat, "Azúcar")).await.unwrap();

        saved.sale_price_cents = 300;
        saved.gross_margin_cents = 0; // stale on purpose
        let updated = db.products().save(&saved).await.unwrap();
        assert_eq!(updated.gross_margin_cents, 180);

        let fetched = db
            .products()
            .get_by_id(saved.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.gross_margin_cents, 180);
    }

    #[tokio::test]
    async fn test_validation_and_unknown_category() {
        let (db, cat) = setup().await;

        let mut bad = product(cat, "Aceite");
        bad.quantity = -1;
        assert_eq!(
            db.products().save(&bad).await.unwrap_err().kind(),
            ErrorKind::Validation
        );

        let mut bad = product(cat, "Aceite");
        bad.cost_cents = -5;
        assert_eq!(
            db.products().save(&bad).await.unwrap_err().kind(),
            ErrorKind::Validation
        );

        let orphan = product(9_999, "Aceite");
        assert_eq!(
            db.products().save(&orphan).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_grouped_by_category() {
        let (db, abarrotes) = setup().await;
        let bebidas = db
            .categories()
            .save(&Category::new("Bebidas"))
            .await
            .unwrap()
            .id
            .unwrap();

        db.products().save(&product(bebidas, "Jugo")).await.unwrap();
        db.products().save(&product(abarrotes, "Sal")).await.unwrap();
        db.products().save(&product(abarrotes, "Harina")).await.unwrap();

        let groups = db.products().get_grouped_by_category().await.unwrap();
        // The empty sentinel category is not listed
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category.name, "Abarrotes");
        let names: Vec<&str> = groups[0].products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Harina", "Sal"]);
        assert_eq!(groups[1].category.name, "Bebidas");
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, cat) = setup().await;
        let saved = db.products().save(&product(cat, "Fideos")).await.unwrap();
        let id = saved.id.unwrap();

        assert_eq!(db.products().get_by_category(cat).await.unwrap().len(), 1);
        db.products().delete(id).await.unwrap();
        assert!(db.products().get_by_id(id).await.unwrap().is_none());

        let err = db.products().delete(id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
