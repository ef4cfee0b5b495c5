use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};

use crate::curl;
use crate::error::AppError;
use crate::model::RequestDescriptor;

/// Message shown inline when a pasted command cannot be translated.
pub const PARSE_FAILURE_MESSAGE: &str = "Error parsing curl command";

#[derive(Debug, Deserialize)]
pub struct ParseCurlRequest {
    pub command: String,
}

#[derive(Debug, Serialize)]
pub struct ParseCurlResponse {
    pub request: RequestDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateCurlResponse {
    pub command: String,
}

/// Translates a pasted curl command. Failures are reported inline, never as an HTTP error.
pub async fn parse_curl(
    payload: Result<Json<ParseCurlRequest>, JsonRejection>,
) -> Result<Json<ParseCurlResponse>, AppError> {
    let Json(input) = payload.map_err(|e| AppError::InvalidBody(e.body_text()))?;
    let parsed = curl::parse(&input.command);

    Ok(Json(ParseCurlResponse {
        request: parsed.request,
        error: parsed.failure.map(|_| PARSE_FAILURE_MESSAGE.to_string()),
    }))
}

pub async fn generate_curl(
    payload: Result<Json<RequestDescriptor>, JsonRejection>,
) -> Result<Json<GenerateCurlResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidBody(e.body_text()))?;
    Ok(Json(GenerateCurlResponse {
        command: curl::to_curl(&request),
    }))
}
