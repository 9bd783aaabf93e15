use async_trait::async_trait;
use std::time::Duration;

use crate::external::live_data::{LiveDataProvider, ProviderError};
use crate::models::ParkLiveData;

const DEFAULT_BASE_URL: &str = "https://api.themeparks.wiki";
const USER_AGENT: &str = "parkpulse/1.0";

/// themeparks.wiki live-data client.
pub struct ThemeParksProvider {
    client: reqwest::Client,
    base_url: String,
}

impl ThemeParksProvider {
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

#[async_trait]
impl LiveDataProvider for ThemeParksProvider {
    async fn fetch_live_data(&self, park_id: &str) -> Result<ParkLiveData, ProviderError> {
        let url = format!("{}/v1/entity/{}/live", self.base_url, park_id);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProviderError::BadResponse(format!(
                "upstream returned status {}",
                resp.status()
            )));
        }

        resp.json::<ParkLiveData>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}
