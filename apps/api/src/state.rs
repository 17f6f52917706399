use std::sync::Arc;

use crate::analysis::orchestrator::Analyzer;
use crate::analysis::registry::SessionRegistry;
use crate::extract::TextExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn TextExtractor>,
    pub analyzer: Arc<Analyzer>,
    pub sessions: SessionRegistry,
}
