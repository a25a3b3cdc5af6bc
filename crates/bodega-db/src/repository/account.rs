//! # Account Repository
//!
//! Receivables (`cuentas_cobrar`) and payables (`cuentas_pagar`) share one
//! shape, so one repository serves both; [`AccountKind`] picks the table.

use sqlx::SqlitePool;
use tracing::{debug, info};

use bodega_core::validation::{normalize_note, validate_name, validate_positive_amount};
use bodega_core::{AccountEntry, AccountKind, Money};

use crate::error::{DbError, DbResult};

fn table(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::Receivable => "cuentas_cobrar",
        AccountKind::Payable => "cuentas_pagar",
    }
}

fn entity(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::Receivable => "Receivable",
        AccountKind::Payable => "Payable",
    }
}

/// Repository for one side of the books.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
    kind: AccountKind,
}

impl AccountRepository {
    /// Creates a repository over the table for `kind`.
    pub fn new(pool: SqlitePool, kind: AccountKind) -> Self {
        AccountRepository { pool, kind }
    }

    /// Which side this repository serves.
    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    fn select(&self) -> String {
        format!(
            "SELECT id, nombre_persona AS counterparty_name, cantidad AS amount_cents, \
             descripcion AS description FROM {}",
            table(self.kind)
        )
    }

    /// All entries, by counterparty name.
    pub async fn get_all(&self) -> DbResult<Vec<AccountEntry>> {
        let sql = format!("{} ORDER BY nombre_persona, id", self.select());
        let entries = sqlx::query_as::<_, AccountEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    /// Gets an entry by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<AccountEntry>> {
        let sql = format!("{} WHERE id = ?1", self.select());
        let entry = sqlx::query_as::<_, AccountEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    /// Inserts (no id) or updates (id set) an entry.
    ///
    /// Blank descriptions are stored as NULL.
    pub async fn save(&self, entry: &AccountEntry) -> DbResult<AccountEntry> {
        let name = validate_name("counterparty_name", &entry.counterparty_name)?;
        validate_positive_amount("amount", entry.amount())?;

        let mut stored = entry.clone();
        stored.counterparty_name = name;
        stored.description = normalize_note(entry.description.as_deref());

        match stored.id {
            None => {
                let sql = format!(
                    "INSERT INTO {} (nombre_persona, cantidad, descripcion) VALUES (?1, ?2, ?3)",
                    table(self.kind)
                );
                let result = sqlx::query(&sql)
                    .bind(&stored.counterparty_name)
                    .bind(stored.amount_cents)
                    .bind(&stored.description)
                    .execute(&self.pool)
                    .await?;

                stored.id = Some(result.last_insert_rowid());
                info!(
                    kind = ?self.kind,
                    id = ?stored.id,
                    counterparty = %stored.counterparty_name,
                    amount = %stored.amount(),
                    "Account entry recorded"
                );
            }
            Some(id) => {
                let sql = format!(
                    "UPDATE {} SET nombre_persona = ?2, cantidad = ?3, descripcion = ?4 WHERE id = ?1",
                    table(self.kind)
                );
                let result = sqlx::query(&sql)
                    .bind(id)
                    .bind(&stored.counterparty_name)
                    .bind(stored.amount_cents)
                    .bind(&stored.description)
                    .execute(&self.pool)
                    .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found(entity(self.kind), id));
                }
                debug!(kind = ?self.kind, id, "Account entry updated");
            }
        }

        Ok(stored)
    }

    /// Deletes an entry (settled or cancelled).
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table(self.kind));
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(entity(self.kind), id));
        }
        info!(kind = ?self.kind, id, "Account entry deleted");
        Ok(())
    }

    /// Sum of all open entries; zero when there are none.
    pub async fn total(&self) -> DbResult<Money> {
        let sql = format!("SELECT COALESCE(SUM(cantidad), 0) FROM {}", table(self.kind));
        let total: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(Money::from_cents(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_sides_are_independent() {
        let db = setup().await;
        db.receivables()
            .save(&AccountEntry::new("Doña Rosa", Money::from_cents(2_500)))
            .await
            .unwrap();
        db.payables()
            .save(&AccountEntry::new("Distribuidora", Money::from_cents(10_000)))
            .await
            .unwrap();

        assert_eq!(db.receivables().total().await.unwrap().cents(), 2_500);
        assert_eq!(db.payables().total().await.unwrap().cents(), 10_000);
        assert_eq!(db.receivables().get_all().await.unwrap().len(), 1);
        assert_eq!(db.payables().kind(), AccountKind::Payable);
    }

    #[tokio::test]
    async fn test_blank_description_stored_as_none() {
        let db = setup().await;
        let saved = db
            .receivables()
            .save(&AccountEntry::new("Juan", Money::from_cents(500)).with_description("   "))
            .await
            .unwrap();
        assert!(saved.description.is_none());

        let fetched = db
            .receivables()
            .get_by_id(saved.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_validation_and_not_found() {
        let db = setup().await;
        let err = db
            .payables()
            .save(&AccountEntry::new("Luz", Money::zero()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = db
            .payables()
            .save(&AccountEntry::new("", Money::from_cents(1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = db.payables().delete(3).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = setup().await;
        let mut entry = db
            .payables()
            .save(&AccountEntry::new("Proveedor", Money::from_cents(4_000)).with_description("Harina"))
            .await
            .unwrap();
        entry.amount_cents = 3_000;
        db.payables().save(&entry).await.unwrap();
        assert_eq!(db.payables().total().await.unwrap().cents(), 3_000);

        db.payables().delete(entry.id.unwrap()).await.unwrap();
        assert!(db.payables().total().await.unwrap().is_zero());
    }
}
