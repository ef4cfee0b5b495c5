use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::AppState;
use crate::error::AppError;
use crate::model::RequestDescriptor;
use crate::proxy::forwarder::sanitize_url_for_logging;
use crate::proxy::{Payload, ProxyRequest, ResponseEnvelope};

pub async fn proxy_request(
    State(state): State<AppState>,
    payload: Result<Json<ProxyRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidBody(e.body_text()))?;

    tracing::debug!(
        method = request.http_method.as_deref().unwrap_or_default(),
        url = %sanitize_url_for_logging(request.end_point.as_deref().unwrap_or_default()),
        "Proxying request"
    );

    let descriptor = RequestDescriptor::try_from(request).map_err(|reason| {
        tracing::warn!(reason = %reason, "Rejected proxy request");
        AppError::from(reason)
    })?;

    let envelope = state.forwarder.forward(&descriptor).await;
    envelope_response(envelope, state.config.is_development())
}

/// Relays a remote response unchanged; transport failures become generic 500s.
pub fn envelope_response(envelope: ResponseEnvelope, expose: bool) -> Result<Response, AppError> {
    match envelope {
        ResponseEnvelope::Remote {
            status,
            content_type,
            payload,
        } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let response = match payload {
                Payload::Json(value) => (status, Json(value)).into_response(),
                Payload::Text(text) => {
                    let content_type =
                        content_type.unwrap_or_else(|| "text/plain; charset=utf-8".to_string());
                    (status, [(header::CONTENT_TYPE, content_type)], text).into_response()
                }
            };
            Ok(response)
        }
        ResponseEnvelope::TransportFailure { kind, diagnostic } => Err(AppError::Transport {
            kind,
            diagnostic,
            expose,
        }),
    }
}
