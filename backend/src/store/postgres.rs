//! PostgreSQL tracking store
//!
//! Uniqueness of (snack, week) is enforced by the table's unique constraint;
//! deliveries go through `ON CONFLICT` so concurrent upserts collapse into one
//! row. Every write returns its annotated row from the same statement, so a
//! committed write is never reported as a failure.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{DateRange, TrackingRecord, TrackingUpdate};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::TrackingStore;
use crate::error::{AppError, AppResult};

/// Columns selected for every record, annotated with the catalog name
const RECORD_FIELDS: &str = r#"
    t.id, t.snack_id, s.name AS snack_name, t.week_start_date,
    t.initial_quantity, t.wasted_quantity, t.shortage_quantity, t.notes,
    t.created_at, t.updated_at
"#;

const SNACK_JOIN: &str = "LEFT JOIN snacks s ON s.id = t.snack_id";

/// SQLSTATE raised when an integer column would overflow
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Annotated read over `snack_tracking`, followed by `tail`
fn select_records(tail: &str) -> String {
    format!("SELECT {RECORD_FIELDS} FROM snack_tracking t {SNACK_JOIN} {tail}")
}

/// Run `write` (which must end in `RETURNING *`) and read back the
/// annotated row within the same statement
fn write_returning_record(write: &str) -> String {
    format!("WITH t AS ({write}) SELECT {RECORD_FIELDS} FROM t {SNACK_JOIN}")
}

fn delivery_error(err: sqlx::Error) -> AppError {
    let out_of_range = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == NUMERIC_VALUE_OUT_OF_RANGE);
    if out_of_range {
        AppError::invalid("quantity", "Quantity is too large")
    } else {
        AppError::StoreError(err)
    }
}

/// Row for tracking queries
#[derive(Debug, FromRow)]
struct TrackingRow {
    id: Uuid,
    snack_id: Uuid,
    snack_name: Option<String>,
    week_start_date: NaiveDate,
    initial_quantity: i32,
    wasted_quantity: i32,
    shortage_quantity: i32,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TrackingRow> for TrackingRecord {
    fn from(row: TrackingRow) -> Self {
        TrackingRecord {
            id: row.id,
            snack_id: row.snack_id,
            snack_name: row.snack_name,
            week_start_date: row.week_start_date,
            initial_quantity: row.initial_quantity,
            wasted_quantity: row.wasted_quantity,
            shortage_quantity: row.shortage_quantity,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Tracking store backed by the `snack_tracking` table
#[derive(Clone)]
pub struct PgTrackingStore {
    db: PgPool,
}

impl PgTrackingStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TrackingStore for PgTrackingStore {
    async fn list_all(&self) -> AppResult<Vec<TrackingRecord>> {
        let query =
            select_records("ORDER BY t.week_start_date DESC, s.name ASC NULLS LAST, t.snack_id");
        let rows = sqlx::query_as::<_, TrackingRow>(&query)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list_in_range(&self, range: DateRange) -> AppResult<Vec<TrackingRecord>> {
        let query = select_records(
            r#"WHERE t.week_start_date >= $1 AND t.week_start_date < $2
            ORDER BY s.name ASC NULLS LAST, t.snack_id, t.week_start_date ASC"#,
        );
        let rows = sqlx::query_as::<_, TrackingRow>(&query)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TrackingRecord>> {
        let query = select_records("WHERE t.id = $1");
        let row = sqlx::query_as::<_, TrackingRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_in_range(
        &self,
        snack_id: Uuid,
        range: DateRange,
    ) -> AppResult<Option<TrackingRecord>> {
        let query = select_records(
            r#"WHERE t.snack_id = $1 AND t.week_start_date >= $2 AND t.week_start_date < $3
            ORDER BY t.week_start_date DESC
            LIMIT 1"#,
        );
        let row = sqlx::query_as::<_, TrackingRow>(&query)
            .bind(snack_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_most_recent(&self, snack_id: Uuid) -> AppResult<Option<TrackingRecord>> {
        let query = select_records(
            r#"WHERE t.snack_id = $1
            ORDER BY t.week_start_date DESC
            LIMIT 1"#,
        );
        let row = sqlx::query_as::<_, TrackingRow>(&query)
            .bind(snack_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn apply_update(
        &self,
        id: Uuid,
        update: &TrackingUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<Option<TrackingRecord>> {
        let query = write_returning_record(
            r#"
            UPDATE snack_tracking
            SET wasted_quantity = $1, shortage_quantity = $2,
                notes = COALESCE($3, notes), updated_at = $4
            WHERE id = $5
            RETURNING *
            "#,
        );
        let row = sqlx::query_as::<_, TrackingRow>(&query)
            .bind(update.wasted_quantity)
            .bind(update.shortage_quantity)
            .bind(&update.notes)
            .bind(at)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn upsert_delivery(
        &self,
        snack_id: Uuid,
        week_start_date: NaiveDate,
        quantity: i32,
        at: DateTime<Utc>,
    ) -> AppResult<TrackingRecord> {
        let query = write_returning_record(
            r#"
            INSERT INTO snack_tracking (id, snack_id, week_start_date, initial_quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (snack_id, week_start_date) DO UPDATE
            SET initial_quantity = snack_tracking.initial_quantity + EXCLUDED.initial_quantity,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        );
        let row = sqlx::query_as::<_, TrackingRow>(&query)
            .bind(Uuid::new_v4())
            .bind(snack_id)
            .bind(week_start_date)
            .bind(quantity)
            .bind(at)
            .fetch_one(&self.db)
            .await
            .map_err(delivery_error)?;
        Ok(row.into())
    }

    async fn clear_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM snack_tracking")
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db).await.is_ok()
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_read_back_in_one_statement() {
        let query = write_returning_record("UPDATE snack_tracking SET notes = $1 RETURNING *");

        assert!(query.starts_with("WITH t AS (UPDATE snack_tracking"));
        assert!(query.contains("FROM t LEFT JOIN snacks s ON s.id = t.snack_id"));
        assert!(!query.contains(';'));
        assert_eq!(query.matches("snack_tracking").count(), 1);
    }

    #[test]
    fn test_reads_join_catalog_names() {
        let query = select_records("WHERE t.id = $1");

        assert!(query.contains("s.name AS snack_name"));
        assert!(query.contains("FROM snack_tracking t LEFT JOIN snacks s"));
        assert!(query.ends_with("WHERE t.id = $1"));
    }

    #[test]
    fn test_non_database_errors_stay_store_errors() {
        let err = delivery_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::StoreError(sqlx::Error::RowNotFound)));
    }
}
