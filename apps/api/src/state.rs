use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::history::store::HistoryStore;
use crate::llm_client::ClientCache;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Guards the history file's load-mutate-save cycle. The evaluate handler
    /// holds this lock for the whole pipeline run, so evaluations serialize
    /// and appends are never lost to interleaving.
    pub history: Arc<Mutex<HistoryStore>>,
    /// Cached LLM client, rebuilt only when tuning settings change.
    pub llm: Arc<ClientCache>,
}
