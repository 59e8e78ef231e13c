pub mod health;
pub mod meetings;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/meetings", post(meetings::create_meeting))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
