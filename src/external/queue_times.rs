use async_trait::async_trait;
use std::time::Duration;

use crate::external::live_data::{LiveDataProvider, ProviderError};
use crate::models::{LiveRideEntry, ParkLiveData, QueueTimesResponse};

const DEFAULT_BASE_URL: &str = "https://queue-times.com";

/// Legacy queue-times.com client. The feed groups rides under themed lands
/// with no park or entity metadata, so entries are flattened and mapped onto
/// the live-data shape.
pub struct QueueTimesProvider {
    client: reqwest::Client,
    base_url: String,
}

impl QueueTimesProvider {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

pub(crate) fn flatten(body: &QueueTimesResponse, park_id: &str) -> Vec<LiveRideEntry> {
    body.lands
        .iter()
        .flat_map(|land| land.rides.iter())
        .map(|ride| ride.to_live_entry(park_id))
        .collect()
}

#[async_trait]
impl LiveDataProvider for QueueTimesProvider {
    async fn fetch_live_data(&self, park_id: &str) -> Result<ParkLiveData, ProviderError> {
        let url = format!("{}/parks/{}/queue_times.json", self.base_url, park_id);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProviderError::BadResponse(format!(
                "upstream returned status {}",
                resp.status()
            )));
        }

        let body: QueueTimesResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(ParkLiveData {
            id: park_id.to_string(),
            entity_type: String::new(),
            name: String::new(),
            timezone: String::new(),
            live_data: flatten(&body, park_id),
        })
    }
}
