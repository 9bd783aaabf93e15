use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::ingest;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(collect))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectRequest {
    #[serde(default)]
    park_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    processed_ids: Vec<String>,
    error_count: usize,
    inserted: usize,
    skipped: usize,
}

/// Triggers one ingestion cycle. An empty or unparseable body falls back to
/// the configured park list.
async fn collect(
    State(state): State<AppState>,
    body: Option<Json<CollectRequest>>,
) -> (StatusCode, Json<CollectResponse>) {
    let requested = body.map(|Json(req)| req.park_ids).unwrap_or_default();
    let park_ids = if requested.is_empty() {
        state.config.park_ids.clone()
    } else {
        requested
    };

    info!("POST /collect - Collecting {} parks", park_ids.len());

    let report =
        ingest::collect_parks(state.store.as_ref(), state.provider.as_ref(), &park_ids).await;

    let success = report.success();
    let message = if success {
        format!(
            "Successfully processed {} parks ({} records inserted, {} skipped)",
            report.processed_ids.len(),
            report.inserted,
            report.skipped
        )
    } else {
        let mut msg = format!(
            "Processed {}/{} parks with {} errors",
            report.processed_ids.len(),
            park_ids.len(),
            report.error_count
        );
        if let Some(last) = &report.last_error {
            msg.push_str(&format!(". Last error: {last}"));
        }
        msg
    };

    let status = if success {
        StatusCode::OK
    } else {
        StatusCode::PARTIAL_CONTENT
    };

    (
        status,
        Json(CollectResponse {
            success,
            message,
            processed_ids: report.processed_ids,
            error_count: report.error_count,
            inserted: report.inserted,
            skipped: report.skipped,
        }),
    )
}
