use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::{api, AppState};

pub fn dashboard_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::serve_dashboard))
        .route("/train", post(api::post_train))
        .route("/api/health", get(api::health_check))
        .route("/api/dashboard", get(api::get_dashboard_data))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_dashboard_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = dashboard_router(state);

    info!("Dashboard server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
