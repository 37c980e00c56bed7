use docsort_extract::Extractor;
use docsort_metrics::MetricsService;
use docsort_models::Config;
use docsort_store::{DocumentStore, UploadDir};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<DocumentStore>,
    pub extractor: Arc<Extractor>,
    pub uploads: Arc<UploadDir>,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<DocumentStore>,
        extractor: Arc<Extractor>,
        uploads: Arc<UploadDir>,
        metrics: Arc<MetricsService>,
    ) -> Self {
        Self {
            config,
            store,
            extractor,
            uploads,
            metrics,
        }
    }
}
