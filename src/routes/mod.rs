//! HTTP surface: the proxy endpoint plus health, curl and history routes.

pub mod curl;
pub mod health;
pub mod history;
pub mod proxy;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::history::{FileStore, HistoryStore, KeyValueStore};
use crate::proxy::{HttpClient, ReqwestClient, RequestForwarder, TransportError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forwarder: Arc<RequestForwarder>,
    pub history: Arc<HistoryStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        client: Arc<dyn HttpClient>,
        storage: Box<dyn KeyValueStore>,
    ) -> Self {
        let forwarder = RequestForwarder::new(client, config.request_timeout);
        let history = HistoryStore::new(storage, config.persist_auth_tokens);
        Self {
            config: Arc::new(config),
            forwarder: Arc::new(forwarder),
            history: Arc::new(history),
        }
    }

    /// Production wiring: reqwest for forwarding, a JSON file for history.
    pub fn from_config(config: Config) -> Result<Self, TransportError> {
        let client = ReqwestClient::arc(config.request_timeout)?;
        let storage = Box::new(FileStore::new(config.history_dir.clone()));
        Ok(Self::new(config, client, storage))
    }
}

/// Builds the application router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/request", post(proxy::proxy_request))
        .route("/api/curl/parse", post(curl::parse_curl))
        .route("/api/curl/generate", post(curl::generate_curl))
        .route(
            "/api/history",
            get(history::list_history)
                .post(history::append_history)
                .delete(history::clear_history),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
