use api_composer::{router, AppState, Config};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_composer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        port = config.port,
        environment = %config.environment,
        history_dir = %config.history_dir.display(),
        "Starting API composer backend"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::from_config(config).expect("failed to build HTTP client");
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("server error");
}
