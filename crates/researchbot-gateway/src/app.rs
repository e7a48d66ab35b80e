use axum::{routing::get, Router};
use researchbot_discord::Dispatcher;
use std::sync::Arc;
use std::time::Instant;

/// Display name reported by `/` and `/status`.
pub const SERVICE_NAME: &str = "Discord Research Agent";

/// Shared state passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    /// Present only when a Discord token was configured.
    pub dispatcher: Option<Arc<Dispatcher>>,
    pub model: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(dispatcher: Option<Arc<Dispatcher>>, model: String) -> Self {
        Self {
            dispatcher,
            model,
            started_at: Instant::now(),
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(crate::http::health::root_handler))
        .route("/status", get(crate::http::health::status_handler))
        .route("/health", get(crate::http::health::health_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
