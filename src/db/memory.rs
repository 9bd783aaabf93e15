use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::db::history_store::{should_insert, HistoryStore, UpsertOutcome};
use crate::models::{HistoryRecord, NewHistoryRecord, RideIdentity};

/// In-memory history store with the same semantics (dedup rule, orderings,
/// tie-breaks) as the Postgres one. Used by the collector, service, and
/// route tests so the ingest pipeline runs without a database.
#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<HistoryRecord>,
    next_id: i64,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn rows_for(&self, identity: &RideIdentity) -> Vec<HistoryRecord> {
        self.inner
            .read()
            .await
            .rows
            .iter()
            .filter(|r| &r.identity() == identity)
            .cloned()
            .collect()
    }
}

fn latest_for(rows: &[HistoryRecord], identity: &RideIdentity) -> Option<DateTime<Utc>> {
    rows.iter()
        .filter(|r| &r.identity() == identity)
        .map(|r| r.last_updated)
        .max()
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn upsert_batch(
        &self,
        records: &[NewHistoryRecord],
    ) -> Result<UpsertOutcome, sqlx::Error> {
        let mut outcome = UpsertOutcome::default();
        let mut inner = self.inner.write().await;

        for record in records {
            let latest = latest_for(&inner.rows, &record.identity());
            if !should_insert(latest, record.last_updated) {
                outcome.skipped += 1;
                continue;
            }

            inner.next_id += 1;
            let id = inner.next_id;
            inner.rows.push(HistoryRecord {
                id,
                ride_id: record.ride_id.clone(),
                external_id: record.external_id.clone(),
                park_id: record.park_id.clone(),
                entity_type: record.entity_type.clone(),
                name: record.name.clone(),
                status: record.status.clone(),
                last_updated: record.last_updated,
                created_at: record.created_at,
                updated_at: Utc::now(),
                operating_hours: record.operating_hours.clone(),
                standby_wait_time: record.standby_wait_time,
                return_time_state: record.return_time_state.clone(),
                return_start: record.return_start,
                return_end: record.return_end,
                forecast: record.forecast.clone(),
            });
            outcome.inserted += 1;
        }

        Ok(outcome)
    }

    async fn latest_per_ride(&self) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let inner = self.inner.read().await;
        let mut latest: std::collections::HashMap<RideIdentity, &HistoryRecord> =
            std::collections::HashMap::new();

        for row in &inner.rows {
            let entry = latest.entry(row.identity()).or_insert(row);
            // Newest last_updated wins; highest id breaks ties.
            if (row.last_updated, row.id) > (entry.last_updated, entry.id) {
                *entry = row;
            }
        }

        let mut result: Vec<HistoryRecord> = latest.into_values().cloned().collect();
        result.sort_by(|a, b| (&a.park_id, &a.name).cmp(&(&b.park_id, &b.name)));
        Ok(result)
    }

    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let inner = self.inner.read().await;
        let mut result: Vec<HistoryRecord> = inner
            .rows
            .iter()
            .filter(|r| r.last_updated >= cutoff)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.last_updated
                .cmp(&a.last_updated)
                .then_with(|| (&a.park_id, &a.name).cmp(&(&b.park_id, &b.name)))
        });
        Ok(result)
    }

    async fn by_park(&self, park_id: &str) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let inner = self.inner.read().await;
        let mut result: Vec<HistoryRecord> = inner
            .rows
            .iter()
            .filter(|r| r.park_id == park_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn by_type(&self, entity_type: &str) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let inner = self.inner.read().await;
        let mut result: Vec<HistoryRecord> = inner
            .rows
            .iter()
            .filter(|r| r.entity_type == entity_type)
            .cloned()
            .collect();
        result.sort_by(|a, b| (&a.park_id, &a.name).cmp(&(&b.park_id, &b.name)));
        Ok(result)
    }

    async fn all(&self) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let inner = self.inner.read().await;
        let mut result = inner.rows.clone();
        result.sort_by(|a, b| {
            (&a.park_id, &a.entity_type, &a.name).cmp(&(&b.park_id, &b.entity_type, &b.name))
        });
        Ok(result)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner.rows.retain(|r| r.updated_at >= cutoff);
        Ok((before - inner.rows.len()) as u64)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
