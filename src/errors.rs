use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{CommitStage, Field, PartialCommit};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{message}")]
    Validation { message: String, fields: Vec<Field> },

    #[error("{0}")]
    Extraction(String),

    #[error("counterparty resolution failed: {0}")]
    Resolution(String),

    #[error("{message}")]
    Commit {
        message: String,
        stage: CommitStage,
        partial: PartialCommit,
    },
}

impl AppError {
    /// Fields named by a validation error, empty for every other kind.
    pub fn fields(&self) -> &[Field] {
        match self {
            AppError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Extraction(_) => StatusCode::BAD_GATEWAY,
            AppError::Resolution(_) => StatusCode::BAD_GATEWAY,
            AppError::Commit { .. } => StatusCode::BAD_GATEWAY,
        };

        let body = match &self {
            AppError::Validation { fields, .. } => {
                serde_json::json!({ "error": self.to_string(), "fields": fields })
            }
            AppError::Commit { stage, partial, .. } => serde_json::json!({
                "error": self.to_string(),
                "stage": stage,
                "partial": partial,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
