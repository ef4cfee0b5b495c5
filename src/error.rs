use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::proxy::{FailureKind, Rejection};

/// Generic message for failures that produced no remote response.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "An error occurred while processing the request";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Rejected(#[from] Rejection),

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("An error occurred while processing the request")]
    Transport {
        kind: FailureKind,
        diagnostic: String,
        /// Include `diagnostic` in the response body.
        expose: bool,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Rejected(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            AppError::InvalidBody(detail) => {
                tracing::debug!(detail = %detail, "Rejected malformed request body");
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            AppError::Transport {
                kind,
                diagnostic,
                expose,
            } => {
                let mut body = json!({
                    "error": self.to_string(),
                    "code": kind.code(),
                });
                if *expose {
                    body["message"] = json!(diagnostic);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        (status, Json(body)).into_response()
    }
}
