//! # Category Repository
//!
//! Database operations for product categories.
//!
//! ## Deleting a Category
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete(id, move_to_default)                                           │
//! │       │                                                                 │
//! │       ├── sentinel "Sin Categoría"?  → ProtectedEntity                  │
//! │       │                                                                 │
//! │       ├── products > 0 and !move     → HasDependents(count)             │
//! │       │                                                                 │
//! │       ├── products > 0 and move      → UPDATE productos                 │
//! │       │                                SET categoria_id = sentinel      │
//! │       │                                                                 │
//! │       └── DELETE FROM categorias                                        │
//! │                                                                         │
//! │  All of it inside one UnitOfWork: a failure leaves products where       │
//! │  they were.                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

use bodega_core::validation::validate_name;
use bodega_core::{Category, CoreError, DEFAULT_CATEGORY_NAME};

use crate::error::{DbError, DbResult};
use crate::unit_of_work::UnitOfWork;

/// Looks up the sentinel category id on any executor (pool or open transaction).
pub(crate) async fn default_category_id<'e, E>(executor: E) -> DbResult<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM categorias WHERE nombre = ?1")
        .bind(DEFAULT_CATEGORY_NAME)
        .fetch_optional(executor)
        .await?;
    Ok(id)
}

async fn fetch_category<'e, E>(executor: E, id: i64) -> DbResult<Option<Category>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, nombre AS name FROM categorias WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(category)
}

fn map_duplicate(err: sqlx::Error, name: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("category name", name),
        other => other,
    }
}

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// All categories, ordered by name.
    pub async fn get_all(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, nombre AS name FROM categorias ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        fetch_category(&self.pool, id).await
    }

    /// Inserts (no id) or updates (id set) a category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - The stored category, id filled in, name trimmed
    /// * `Err(Validation)` - Blank name
    /// * `Err(UniqueViolation)` - Name already used by another category
    /// * `Err(ProtectedEntity)` - Renaming the sentinel category
    /// * `Err(NotFound)` - Updating an id that doesn't exist
    pub async fn save(&self, category: &Category) -> DbResult<Category> {
        let name = validate_name("name", &category.name)?;

        match category.id {
            None => {
                debug!(name = %name, "Inserting category");

                let result = sqlx::query("INSERT INTO categorias (nombre) VALUES (?1)")
                    .bind(&name)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| map_duplicate(e, &name))?;

                Ok(Category {
                    id: Some(result.last_insert_rowid()),
                    name,
                })
            }
            Some(id) => {
                debug!(id, name = %name, "Updating category");

                let stored = self
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Category", id))?;

                if stored.is_default() && name != DEFAULT_CATEGORY_NAME {
                    return Err(CoreError::ProtectedEntity {
                        entity: "Category".to_string(),
                        name: stored.name,
                    }
                    .into());
                }

                sqlx::query("UPDATE categorias SET nombre = ?2 WHERE id = ?1")
                    .bind(id)
                    .bind(&name)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| map_duplicate(e, &name))?;

                Ok(Category { id: Some(id), name })
            }
        }
    }

    /// Deletes a category.
    ///
    /// With `move_to_default`, products still in the category are first
    /// re-parented to the sentinel category. Returns how many were moved.
    pub async fn delete(&self, id: i64, move_to_default: bool) -> DbResult<u64> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let category = fetch_category(uow.conn(), id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))?;

        if category.is_default() {
            return Err(CoreError::ProtectedEntity {
                entity: "Category".to_string(),
                name: category.name,
            }
            .into());
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE categoria_id = ?1")
            .bind(id)
            .fetch_one(uow.conn())
            .await?;

        let mut moved = 0;
        if count > 0 {
            if !move_to_default {
                return Err(CoreError::HasDependents {
                    entity: format!("Category '{}'", category.name),
                    count,
                }
                .into());
            }

            let default_id = default_category_id(uow.conn())
                .await?
                .ok_or_else(|| DbError::not_found("Category", DEFAULT_CATEGORY_NAME))?;

            moved = sqlx::query("UPDATE productos SET categoria_id = ?2 WHERE categoria_id = ?1")
                .bind(id)
                .bind(default_id)
                .execute(uow.conn())
                .await?
                .rows_affected();
        }

        sqlx::query("DELETE FROM categorias WHERE id = ?1")
            .bind(id)
            .execute(uow.conn())
            .await?;

        uow.commit().await?;

        info!(id, name = %category.name, moved, "Category deleted");
        Ok(moved)
    }

    /// Number of products in a category.
    pub async fn count_products(&self, id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE categoria_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Units on hand across the category's products; 0 when empty.
    pub async fn total_stock(&self, id: i64) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(cantidad), 0) FROM productos WHERE categoria_id = ?1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Moves every product of `from` into `to`. Returns the number moved.
    pub async fn move_products(&self, from: i64, to: i64) -> DbResult<u64> {
        if fetch_category(&self.pool, to).await?.is_none() {
            return Err(DbError::not_found("Category", to));
        }

        let moved = sqlx::query("UPDATE productos SET categoria_id = ?2 WHERE categoria_id = ?1")
            .bind(from)
            .bind(to)
            .execute(&self.pool)
            .await?
            .rows_affected();

        info!(from, to, moved, "Moved products between categories");
        Ok(moved)
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
    use bodega_core::{Money, Product};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_product(db: &Database, category_id: i64, name: &str, qty: i64) -> Product {
        db.products()
            .save(&Product::new(
                name,
                category_id,
                Money::from_cents(100),
                Money::from_cents(150),
                qty,
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_trims_and_round_trips() {
        let db = setup().await;
        let saved = db
            .categories()
            .save(&Category::new("  Bebidas "))
            .await
            .unwrap();
        assert_eq!(saved.name, "Bebidas");

        let fetched = db
            .categories()
            .get_by_id(saved.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = setup().await;
        db.categories().save(&Category::new("Lácteos")).await.unwrap();
        let err = db
            .categories()
            .save(&Category::new("Lácteos"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
    }

    #[tokio::test]
    async fn test_rename_to_existing_name() {
        let db = setup().await;
        db.categories().save(&Category::new("Lácteos")).await.unwrap();
        let mut bebidas = db.categories().save(&Category::new("Bebidas")).await.unwrap();

        bebidas.name = " Lácteos ".to_string();
        let err = db.categories().save(&bebidas).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);

        let stored = db
            .categories()
            .get_by_id(bebidas.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Bebidas");
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let db = setup().await;
        let err = db.categories().save(&Category::new("  ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_get_all_ordered_by_name() {
        let db = setup().await;
        db.categories().save(&Category::new("Limpieza")).await.unwrap();
        db.categories().save(&Category::new("Abarrotes")).await.unwrap();

        let names: Vec<String> = db
            .categories()
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Abarrotes", "Limpieza", DEFAULT_CATEGORY_NAME]);
    }

    #[tokio::test]
    async fn test_sentinel_cannot_be_deleted_or_renamed() {
        let db = setup().await;
        let default_id = db.default_category_id().await.unwrap().unwrap();

        let err = db.categories().delete(default_id, true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtectedEntity);

        let err = db
            .categories()
            .save(&Category {
                id: Some(default_id),
                name: "Otra".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtectedEntity);
        assert!(db.categories().get_by_id(default_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_with_dependents_requires_move() {
        let db = setup().await;
        let cat = db.categories().save(&Category::new("Snacks")).await.unwrap();
        let cat_id = cat.id.unwrap();
        add_product(&db, cat_id, "Papas", 4).await;
        add_product(&db, cat_id, "Maní", 6).await;

        let err = db.categories().delete(cat_id, false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HasDependents);
        assert_eq!(db.categories().count_products(cat_id).await.unwrap(), 2);

        let moved = db.categories().delete(cat_id, true).await.unwrap();
        assert_eq!(moved, 2);
        assert!(db.categories().get_by_id(cat_id).await.unwrap().is_none());

        let default_id = db.default_category_id().await.unwrap().unwrap();
        assert_eq!(db.categories().count_products(default_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_empty_category() {
        let db = setup().await;
        let cat = db.categories().save(&Category::new("Vacía")).await.unwrap();
        assert_eq!(db.categories().delete(cat.id.unwrap(), false).await.unwrap(), 0);

        let err = db.categories().delete(cat.id.unwrap(), false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_move_without_sentinel_fails_and_keeps_products() {
        let db = Database::new(DbConfig::in_memory().bootstrap(false))
            .await
            .unwrap();
        let cat = db.categories().save(&Category::new("Huérfana")).await.unwrap();
        let cat_id = cat.id.unwrap();
        add_product(&db, cat_id, "Vela", 1).await;

        let err = db.categories().delete(cat_id, true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(db.categories().count_products(cat_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_total_stock_and_move_products() {
        let db = setup().await;
        let a = db.categories().save(&Category::new("A")).await.unwrap().id.unwrap();
        let b = db.categories().save(&Category::new("B")).await.unwrap().id.unwrap();
        assert_eq!(db.categories().total_stock(a).await.unwrap(), 0);

        add_product(&db, a, "Uno", 3).await;
        add_product(&db, a, "Dos", 7).await;
        assert_eq!(db.categories().total_stock(a).await.unwrap(), 10);

        assert_eq!(db.categories().move_products(a, b).await.unwrap(), 2);
        assert_eq!(db.categories().total_stock(b).await.unwrap(), 10);
        assert_eq!(db.categories().count_products(a).await.unwrap(), 0);
    }
}
