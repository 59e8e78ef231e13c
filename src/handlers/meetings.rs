use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::services::operator::Headless;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), Response> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "unauthorized"})),
        )
            .into_response());
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct MeetingRequest {
    pub request: String,
}

// POST /api/meetings
//
// Always non-interactive: nobody can be prompted over HTTP, so anything
// missing from the request is a 422.
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<MeetingRequest>,
) -> Response {
    if let Some(token) = &state.config.api_token {
        if let Err(resp) = check_auth(&headers, token) {
            return resp;
        }
    }

    let request = body.request.trim();
    if request.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "request must not be empty"})),
        )
            .into_response();
    }

    match state
        .scheduler
        .process_meeting_request(request, &Headless)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "meeting request failed");
            e.into_response()
        }
    }
}
