use chrono::{Duration, FixedOffset, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::error;

use crate::db::HistoryStore;
use crate::errors::AppError;
use crate::models::{HistoryRecord, TrendPoint};
use crate::services::trends::wait_time_trends;

const HISTORY_WINDOW_HOURS: i64 = 24;

/// Assembled read view served by `/wait-times`: the latest sample per ride,
/// the last 24 hours of history, and per-ride trend deltas keyed by
/// `parkId:externalId`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitTimesView {
    pub live: Vec<HistoryRecord>,
    pub history: Vec<HistoryRecord>,
    pub trends: HashMap<String, Vec<TrendPoint>>,
}

pub async fn get_wait_times(
    store: &dyn HistoryStore,
    park_offset: FixedOffset,
) -> Result<WaitTimesView, AppError> {
    let live = store.latest_per_ride().await.map_err(|e| {
        error!("Failed to fetch latest rows: {}", e);
        AppError::Db(e)
    })?;

    let cutoff = Utc::now() - Duration::hours(HISTORY_WINDOW_HOURS);
    let history = store.since(cutoff).await.map_err(|e| {
        error!("Failed to fetch history since {}: {}", cutoff, e);
        AppError::Db(e)
    })?;

    let mut per_ride: HashMap<String, Vec<HistoryRecord>> = HashMap::new();
    for record in &history {
        per_ride
            .entry(record.identity().to_string())
            .or_default()
            .push(record.clone());
    }

    let trends = per_ride
        .into_iter()
        .map(|(key, mut rows)| {
            // `since` returns newest-first; the trend pass wants ascending.
            rows.sort_by_key(|r| r.last_updated);
            (key, wait_time_trends(&rows, park_offset))
        })
        .collect();

    Ok(WaitTimesView {
        live,
        history,
        trends,
    })
}

pub async fn get_by_park(
    store: &dyn HistoryStore,
    park_id: &str,
) -> Result<Vec<HistoryRecord>, AppError> {
    store.by_park(park_id).await.map_err(|e| {
        error!("Failed to fetch history for park {}: {}", park_id, e);
        AppError::Db(e)
    })
}

pub async fn get_by_type(
    store: &dyn HistoryStore,
    entity_type: &str,
) -> Result<Vec<HistoryRecord>, AppError> {
    store.by_type(entity_type).await.map_err(|e| {
        error!("Failed to fetch history for type {}: {}", entity_type, e);
        AppError::Db(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryHistoryStore;
    use crate::models::NewHistoryRecord;
    use chrono::DateTime;

    fn record(ext: &str, park: &str, wait: i32, at: DateTime<Utc>) -> NewHistoryRecord {
        NewHistoryRecord {
            ride_id: ext.to_string(),
            external_id: ext.to_string(),
            park_id: park.to_string(),
            entity_type: "ATTRACTION".to_string(),
            name: format!("ride-{ext}"),
            status: "OPERATING".to_string(),
            last_updated: at,
            created_at: at,
            updated_at: at,
            operating_hours: "[]".to_string(),
            standby_wait_time: Some(wait),
            return_time_state: None,
            return_start: None,
            return_end: None,
            forecast: "[]".to_string(),
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test]
    async fn empty_store_yields_empty_view() {
        let store = MemoryHistoryStore::new();
        let view = get_wait_times(&store, utc()).await.unwrap();
        assert!(view.live.is_empty());
        assert!(view.history.is_empty());
        assert!(view.trends.is_empty());
    }

    #[tokio::test]
    async fn view_carries_latest_history_and_trends() {
        use chrono::Timelike;

        let store = MemoryHistoryStore::new();
        let base = Utc::now() - Duration::hours(2);
        // Pick an offset that places `base` at noon park-local so the hour
        // filter keeps every sample regardless of when the test runs.
        let shift_hours = (12 + 24 - base.hour() as i32) % 24;
        let offset = FixedOffset::east_opt(shift_hours * 3600).unwrap();

        store
            .upsert_batch(&[record("e1", "p1", 30, base)])
            .await
            .unwrap();
        store
            .upsert_batch(&[record("e1", "p1", 45, base + Duration::minutes(10))])
            .await
            .unwrap();
        store
            .upsert_batch(&[record("e2", "p1", 5, base)])
            .await
            .unwrap();

        let view = get_wait_times(&store, offset).await.unwrap();
        assert_eq!(view.live.len(), 2);
        assert_eq!(view.history.len(), 3);

        let trends = view.trends.get("p1:e1").unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].trend, 15);
        assert!(view.trends.get("p1:e2").unwrap().is_empty());
    }

    #[tokio::test]
    async fn by_park_and_by_type_filter() {
        let store = MemoryHistoryStore::new();
        let base = Utc::now();
        store
            .upsert_batch(&[record("e1", "p1", 30, base), record("e2", "p2", 10, base)])
            .await
            .unwrap();

        let p1 = get_by_park(&store, "p1").await.unwrap();
        assert_eq!(p1.len(), 1);
        assert_eq!(p1[0].external_id, "e1");

        let attractions = get_by_type(&store, "ATTRACTION").await.unwrap();
        assert_eq!(attractions.len(), 2);
        assert!(get_by_type(&store, "SHOW").await.unwrap().is_empty());
    }
}
