use std::sync::Arc;

use crate::config::CollectorConfig;
use crate::db::HistoryStore;
use crate::external::LiveDataProvider;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HistoryStore>,
    pub provider: Arc<dyn LiveDataProvider>,
    pub config: CollectorConfig,
}
