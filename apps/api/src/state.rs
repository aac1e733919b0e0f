use std::sync::Arc;

use crate::conversation::engine::ChatEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the session store and both stages; built once at startup from `Config`.
    pub engine: Arc<ChatEngine>,
}
