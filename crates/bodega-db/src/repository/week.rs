//! # Week Repository
//!
//! The period registry: weekly date ranges that never overlap.
//!
//! ## Saving a Week
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save(week)                                                            │
//! │       │                                                                 │
//! │       ├── start > end?            → Validation                         │
//! │       │                                                                 │
//! │       ├── verify_overlap(start, end, exclude = week.id)                │
//! │       │     scans other weeks with period::periods_overlap             │
//! │       │     ├── conflict found    → Overlap(Some(week))                │
//! │       │     └── query failed      → Overlap(None)   (fail closed)      │
//! │       │                                                                 │
//! │       └── INSERT / UPDATE                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a week discards its sales through the schema cascade. Stock is
//! not credited back for them; the returned [`WeekDeletion`] reports how many
//! were dropped.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use bodega_core::period::{periods_overlap, validate_period};
use bodega_core::{CoreError, OverlapCheck, Week, WeekDeletion};

use crate::error::{DbError, DbResult};
use crate::unit_of_work::UnitOfWork;

type WeekRow = (i64, NaiveDate, NaiveDate);

fn to_week((id, start, end): WeekRow) -> Week {
    Week::with_id(id, start, end)
}

/// Repository for weekly periods.
#[derive(Debug, Clone)]
pub struct WeekRepository {
    pool: SqlitePool,
}

impl WeekRepository {
    /// Creates a new WeekRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WeekRepository { pool }
    }

    /// All weeks, most recent first.
    pub async fn get_all(&self) -> DbResult<Vec<Week>> {
        let rows = sqlx::query_as::<_, WeekRow>(
            "SELECT id, fecha_inicio, fecha_fin FROM semanas ORDER BY fecha_inicio DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(to_week).collect())
    }

    /// Gets a week by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Week>> {
        let row = sqlx::query_as::<_, WeekRow>(
            "SELECT id, fecha_inicio, fecha_fin FROM semanas WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(to_week))
    }

    /// The week whose range contains `date`, if any.
    pub async fn find_containing(&self, date: NaiveDate) -> DbResult<Option<Week>> {
        let row = sqlx::query_as::<_, WeekRow>(
            r#"
            SELECT id, fecha_inicio, fecha_fin
            FROM semanas
            WHERE fecha_inicio <= ?1 AND fecha_fin >= ?1
            LIMIT 1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(to_week))
    }

    /// Checks `[start, end]` against every stored week except `exclude_id`.
    ///
    /// The earliest conflicting week is reported.
    ///
    /// Never fails: if the lookup itself errors, the result reports an
    /// overlap with no identified conflict so that callers refuse the write.
    pub async fn verify_overlap(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<i64>,
    ) -> OverlapCheck {
        let candidates = sqlx::query_as::<_, WeekRow>(
            r#"
            SELECT id, fecha_inicio, fecha_fin
            FROM semanas
            WHERE (?1 IS NULL OR id != ?1)
            ORDER BY fecha_inicio
            "#,
        )
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await;

        let conflict = candidates.map(|rows| {
            rows.into_iter()
                .find(|(_, week_start, week_end)| periods_overlap(start, end, *week_start, *week_end))
        });

        match conflict {
            Ok(Some(row)) => {
                let week = to_week(row);
                debug!(
                    start = %start,
                    end = %end,
                    conflicting_id = ?week.id,
                    "Period overlaps existing week"
                );
                OverlapCheck::conflict(week)
            }
            Ok(None) => OverlapCheck::clear(),
            Err(e) => {
                error!(
                    start = %start,
                    end = %end,
                    error = %e,
                    "Overlap check failed, treating period as overlapping"
                );
                OverlapCheck::unknown()
            }
        }
    }

    /// Inserts (no id) or updates (id set) a week.
    ///
    /// ## Returns
    /// * `Ok(Week)` - The stored week with its ISO week number
    /// * `Err(Validation)` - start after end
    /// * `Err(Overlap)` - Range intersects another week
    /// * `Err(NotFound)` - Updating an id that doesn't exist
    pub async fn save(&self, week: &Week) -> DbResult<Week> {
        validate_period("week", week.start_date, week.end_date)?;

        let check = self
            .verify_overlap(week.start_date, week.end_date, week.id)
            .await;
        if check.overlaps {
            return Err(CoreError::Overlap {
                conflicting: check.conflicting,
            }
            .into());
        }

        match week.id {
            None => {
                let result =
                    sqlx::query("INSERT INTO semanas (fecha_inicio, fecha_fin) VALUES (?1, ?2)")
                        .bind(week.start_date)
                        .bind(week.end_date)
                        .execute(&self.pool)
                        .await?;

                let saved = Week::with_id(result.last_insert_rowid(), week.start_date, week.end_date);
                info!(
                    id = ?saved.id,
                    start = %saved.start_date,
                    end = %saved.end_date,
                    week_number = saved.week_number,
                    "Week created"
                );
                Ok(saved)
            }
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE semanas SET fecha_inicio = ?2, fecha_fin = ?3 WHERE id = ?1",
                )
                .bind(id)
                .bind(week.start_date)
                .bind(week.end_date)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Week", id));
                }

                debug!(id, "Week updated");
                Ok(Week::with_id(id, week.start_date, week.end_date))
            }
        }
    }

    /// Deletes a week and, through the cascade, its sales.
    pub async fn delete(&self, id: i64) -> DbResult<WeekDeletion> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let discarded_sales: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ventas WHERE semana_id = ?1")
                .bind(id)
                .fetch_one(uow.conn())
                .await?;

        let result = sqlx::query("DELETE FROM semanas WHERE id = ?1")
            .bind(id)
            .execute(uow.conn())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Week", id));
        }

        uow.commit().await?;

        if discarded_sales > 0 {
            warn!(
                week_id = id,
                discarded_sales,
                "Week deleted; its sales were discarded without restoring stock"
            );
        } else {
            info!(week_id = id, "Week deleted");
        }

        Ok(WeekDeletion {
            week_id: id,
            discarded_sales,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
