use async_trait::async_trait;
use thiserror::Error;

use crate::models::ParkLiveData;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Upstream seam for live ride status. Implementations return a flat list of
/// ride snapshots for one park; conversion and persistence happen elsewhere.
#[async_trait]
pub trait LiveDataProvider: Send + Sync {
    async fn fetch_live_data(&self, park_id: &str) -> Result<ParkLiveData, ProviderError>;
}
