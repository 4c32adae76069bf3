use std::sync::Arc;

use crate::config::Config;
use crate::drafting::generator::TextGenerator;
use crate::listings::store::ListingStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory with `STORAGE=memory` and in tests.
    pub listings: Arc<dyn ListingStore>,
    /// Default: `LlmClient` (OpenAI). Tests swap in a scripted generator.
    pub generator: Arc<dyn TextGenerator>,
    pub config: Config,
}
