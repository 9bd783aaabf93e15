use serde::Serialize;
use tracing::{error, info, warn};

use crate::db::{HistoryStore, UpsertOutcome};
use crate::errors::AppError;
use crate::external::LiveDataProvider;
use crate::models::NewHistoryRecord;

/// Result of one collection pass over a set of parks. Per-park failures are
/// isolated: one park failing does not stop the others.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub processed_ids: Vec<String>,
    pub error_count: usize,
    pub inserted: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl IngestReport {
    pub fn success(&self) -> bool {
        self.error_count == 0
    }
}

/// Fetches one park's live data, converts entries to rows, and writes them
/// under the dedup rule. Entries that fail conversion are logged and
/// dropped; only transaction-layer failures fail the batch.
pub async fn collect_park(
    store: &dyn HistoryStore,
    provider: &dyn LiveDataProvider,
    park_id: &str,
) -> Result<UpsertOutcome, AppError> {
    info!("Fetching live data for park {}", park_id);

    let park = provider.fetch_live_data(park_id).await?;
    if park.live_data.is_empty() {
        info!("No live data available for park {}", park_id);
        return Ok(UpsertOutcome::default());
    }

    let mut records: Vec<NewHistoryRecord> = Vec::with_capacity(park.live_data.len());
    for entry in &park.live_data {
        match entry.to_new_record() {
            Ok(record) => records.push(record),
            Err(e) => warn!("Dropping entry {}: {}", entry.name, e),
        }
    }

    let outcome = store.upsert_batch(&records).await?;
    info!(
        "Park {}: {} inserted, {} skipped",
        park_id, outcome.inserted, outcome.skipped
    );
    Ok(outcome)
}

/// Runs `collect_park` for every park, accumulating counts. Never returns an
/// error; failures show up in the report.
pub async fn collect_parks(
    store: &dyn HistoryStore,
    provider: &dyn LiveDataProvider,
    park_ids: &[String],
) -> IngestReport {
    let mut report = IngestReport::default();

    for park_id in park_ids {
        match collect_park(store, provider, park_id).await {
            Ok(outcome) => {
                report.processed_ids.push(park_id.clone());
                report.inserted += outcome.inserted;
                report.skipped += outcome.skipped;
            }
            Err(e) => {
                error!("Failed to process park {}: {}", park_id, e);
                report.error_count += 1;
                report.last_error = Some(format!("park {park_id}: {e}"));
            }
        }
    }

    report
}
