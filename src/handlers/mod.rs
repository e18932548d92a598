//! Operator HTTP surface under `/api-docs`, plus `/health`

pub mod generate;
pub mod health;
pub mod logs_api;

use crate::docs::DocumentationSynthesizer;
use crate::inventory::RouteRegistry;
use crate::store::ExchangeStore;
use std::sync::Arc;

/// Shared state for the operator handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ExchangeStore>,
    pub registry: Arc<RouteRegistry>,
    pub synthesizer: Arc<DocumentationSynthesizer>,
}
