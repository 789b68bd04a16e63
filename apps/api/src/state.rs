use std::sync::Arc;

use crate::assistant::orchestrator::Orchestrator;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Rodrigo. Owns the prompt builder and the model client.
    pub assistant: Arc<Orchestrator>,
    /// Pluggable session store. Redis when `REDIS_URL` is set, in-memory otherwise.
    pub sessions: Arc<dyn SessionStore>,
}
