use std::sync::Arc;
use crate::config::AnalyticsConfig;
use crate::AnalyticsStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AnalyticsStore>,
    pub config: AnalyticsConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn AnalyticsStore>, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }
}
