//! End-to-end ingestion and HTTP surface tests over the in-memory store.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

use parkpulse_backend::app::create_app;
use parkpulse_backend::config::CollectorConfig;
use parkpulse_backend::db::{HistoryStore, MemoryHistoryStore};
use parkpulse_backend::external::{LiveDataProvider, ProviderError};
use parkpulse_backend::models::{
    EntityType, LiveRideEntry, NewHistoryRecord, ParkLiveData, QueueInfo, RideIdentity,
    RideStatus, StandbyQueue,
};
use parkpulse_backend::state::AppState;

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

#[tokio::test]
async fn dedup_scenario_insert_skip_insert() {
    let store = MemoryHistoryStore::new();
    let t = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    // Fresh store: first sighting inserts.
    let outcome = store
        .upsert_batch(&[record("e1", "p1", 30, t)])
        .await
        .unwrap();
    assert_eq!((outcome.inserted, outcome.skipped), (1, 0));

    // Two minutes later: inside the window, skipped.
    let outcome = store
        .upsert_batch(&[record("e1", "p1", 35, t + Duration::minutes(2))])
        .await
        .unwrap();
    assert_eq!((outcome.inserted, outcome.skipped), (0, 1));

    // Six minutes after the stored row: outside the window, inserted.
    let outcome = store
        .upsert_batch(&[record("e1", "p1", 40, t + Duration::minutes(6))])
        .await
        .unwrap();
    assert_eq!((outcome.inserted, outcome.skipped), (1, 0));

    let identity = RideIdentity {
        external_id: "e1".to_string(),
        park_id: "p1".to_string(),
    };
    assert_eq!(store.rows_for(&identity).await.len(), 2);
}

#[tokio::test]
async fn dedup_boundary_is_inclusive_at_five_minutes() {
    let store = MemoryHistoryStore::new();
    let t = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    store.upsert_batch(&[record("e1", "p1", 30, t)]).await.unwrap();

    let outcome = store
        .upsert_batch(&[record(
            "e1",
            "p1",
            35,
            t + Duration::minutes(4) + Duration::seconds(59),
        )])
        .await
        .unwrap();
    assert_eq!((outcome.inserted, outcome.skipped), (0, 1));

    let outcome = store
        .upsert_batch(&[record("e1", "p1", 35, t + Duration::minutes(5))])
        .await
        .unwrap();
    assert_eq!((outcome.inserted, outcome.skipped), (1, 0));
}

/// Serves a scripted queue of live-data batches, then repeats the last one.
struct ScriptedProvider {
    batches: Mutex<Vec<Vec<LiveRideEntry>>>,
}

impl ScriptedProvider {
    fn new(batches: Vec<Vec<LiveRideEntry>>) -> Self {
        Self {
            batches: Mutex::new(batches),
        }
    }
}

#[async_trait]
impl LiveDataProvider for ScriptedProvider {
    async fn fetch_live_data(&self, park_id: &str) -> Result<ParkLiveData, ProviderError> {
        let mut batches = self.batches.lock().await;
        let batch = if batches.len() > 1 {
            batches.remove(0)
        } else {
            batches.first().cloned().unwrap_or_default()
        };
        Ok(ParkLiveData {
            id: park_id.to_string(),
            entity_type: String::new(),
            name: String::new(),
            timezone: String::new(),
            live_data: batch,
        })
    }
}

fn entry(ext: &str, wait: i32, at: DateTime<Utc>) -> LiveRideEntry {
    LiveRideEntry {
        id: ext.to_string(),
        park_id: "p1".to_string(),
        external_id: ext.to_string(),
        entity_type: EntityType::Attraction,
        name: format!("ride-{ext}"),
        status: RideStatus::Operating,
        last_updated: at,
        operating_hours: Vec::new(),
        queue: Some(QueueInfo {
            standby: Some(StandbyQueue {
                wait_time: Some(wait),
            }),
            return_time: None,
        }),
        forecast: Vec::new(),
    }
}

fn test_state(provider: Arc<dyn LiveDataProvider>) -> (Arc<MemoryHistoryStore>, AppState) {
    let store = Arc::new(MemoryHistoryStore::new());
    let config = CollectorConfig {
        park_ids: vec!["p1".to_string()],
        ..CollectorConfig::default()
    };
    let state = AppState {
        store: store.clone(),
        provider,
        config,
    };
    (store, state)
}

#[tokio::test]
async fn collect_endpoint_inserts_then_skips() {
    let now = Utc::now();
    let provider = Arc::new(ScriptedProvider::new(vec![vec![
        entry("e1", 30, now),
        entry("e2", 10, now),
    ]]));
    let (store, state) = test_state(provider);
    let app = create_app(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/collect")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.len().await, 2);

    // Same data again: everything lands inside the dedup window.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/collect")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn collect_endpoint_accepts_explicit_park_list() {
    let now = Utc::now();
    let provider = Arc::new(ScriptedProvider::new(vec![vec![entry("e1", 30, now)]]));
    let (store, state) = test_state(provider);
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/collect")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"parkIds": ["p1"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn wait_times_endpoint_serves_assembled_view() {
    let now = Utc::now();
    let provider = Arc::new(ScriptedProvider::new(vec![vec![entry("e1", 30, now)]]));
    let (store, state) = test_state(provider);
    store
        .upsert_batch(&[record("e1", "p1", 30, now - Duration::hours(1))])
        .await
        .unwrap();
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/wait-times")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let view: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(view["live"].as_array().unwrap().len(), 1);
    assert_eq!(view["history"].as_array().unwrap().len(), 1);
    assert!(view["trends"].is_object());
}

#[tokio::test]
async fn park_and_type_endpoints_filter() {
    let now = Utc::now();
    let provider = Arc::new(ScriptedProvider::new(vec![Vec::new()]));
    let (store, state) = test_state(provider);
    store
        .upsert_batch(&[record("e1", "p1", 30, now)])
        .await
        .unwrap();
    let app = create_app(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/wait-times/park/p1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/wait-times/type/SHOW")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(rows.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let provider = Arc::new(ScriptedProvider::new(vec![Vec::new()]));
    let (_store, state) = test_state(provider);
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
