use std::sync::Arc;

use crate::config::Config;
use crate::services::DocumentAnalyzer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<dyn DocumentAnalyzer>,
}

impl AppState {
    pub fn new(config: Config, analyzer: Arc<dyn DocumentAnalyzer>) -> Self {
        Self {
            config: Arc::new(config),
            analyzer,
        }
    }
}
