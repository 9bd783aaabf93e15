use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::db::history_store::{should_insert, HistoryStore, UpsertOutcome};
use crate::models::{HistoryRecord, NewHistoryRecord};

const COLUMNS: &str = "id, ride_id, external_id, park_id, entity_type, name, status, \
     last_updated, created_at, updated_at, operating_hours, standby_wait_time, \
     return_time_state, return_start, return_end, forecast";

/// Postgres-backed history store.
#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn upsert_batch(
        &self,
        records: &[NewHistoryRecord],
    ) -> Result<UpsertOutcome, sqlx::Error> {
        if records.is_empty() {
            return Ok(UpsertOutcome::default());
        }

        let mut outcome = UpsertOutcome::default();
        let mut tx = self.pool.begin().await?;

        for record in records {
            let latest: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
                "SELECT id, last_updated
                 FROM ride_data_history
                 WHERE external_id = $1 AND park_id = $2
                 ORDER BY last_updated DESC
                 LIMIT 1",
            )
            .bind(&record.external_id)
            .bind(&record.park_id)
            .fetch_optional(&mut *tx)
            .await?;

            if !should_insert(latest.map(|(_, t)| t), record.last_updated) {
                debug!(
                    "Skipping {} ({}): within dedup window",
                    record.name,
                    record.identity()
                );
                outcome.skipped += 1;
                continue;
            }

            sqlx::query(
                "INSERT INTO ride_data_history (
                     ride_id, external_id, park_id, entity_type, name, status,
                     last_updated, created_at, updated_at, operating_hours,
                     standby_wait_time, return_time_state, return_start,
                     return_end, forecast
                 ) VALUES (
                     $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15
                 )",
            )
            .bind(&record.ride_id)
            .bind(&record.external_id)
            .bind(&record.park_id)
            .bind(&record.entity_type)
            .bind(&record.name)
            .bind(&record.status)
            .bind(record.last_updated)
            .bind(record.created_at)
            .bind(Utc::now())
            .bind(&record.operating_hours)
            .bind(record.standby_wait_time)
            .bind(&record.return_time_state)
            .bind(record.return_start)
            .bind(record.return_end)
            .bind(&record.forecast)
            .execute(&mut *tx)
            .await?;

            outcome.inserted += 1;
        }

        tx.commit().await?;
        Ok(outcome)
    }

    async fn latest_per_ride(&self) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        // DISTINCT ON picks the newest row per identity; id breaks timestamp
        // ties deterministically.
        let query = format!(
            "SELECT {COLUMNS} FROM (
                 SELECT DISTINCT ON (external_id, park_id) {COLUMNS}
                 FROM ride_data_history
                 ORDER BY external_id, park_id, last_updated DESC, id DESC
             ) AS latest
             ORDER BY park_id ASC, name ASC"
        );
        sqlx::query_as::<_, HistoryRecord>(&query)
            .fetch_all(&self.pool)
            .await
    }

    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}
             FROM ride_data_history
             WHERE last_updated >= $1
             ORDER BY last_updated DESC, park_id ASC, name ASC"
        );
        sqlx::query_as::<_, HistoryRecord>(&query)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
    }

    async fn by_park(&self, park_id: &str) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}
             FROM ride_data_history
             WHERE park_id = $1
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, HistoryRecord>(&query)
            .bind(park_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn by_type(&self, entity_type: &str) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}
             FROM ride_data_history
             WHERE entity_type = $1
             ORDER BY park_id ASC, name ASC"
        );
        sqlx::query_as::<_, HistoryRecord>(&query)
            .bind(entity_type)
            .fetch_all(&self.pool)
            .await
    }

    async fn all(&self) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}
             FROM ride_data_history
             ORDER BY park_id ASC, entity_type ASC, name ASC"
        );
        sqlx::query_as::<_, HistoryRecord>(&query)
            .fetch_all(&self.pool)
            .await
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ride_data_history WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
