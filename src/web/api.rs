use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Json,
};
use askama::Template;
use serde_json::json;
use tracing::{error, info};

use super::{AppState, DashboardPage};

pub async fn serve_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.controller.snapshot().await;
    match DashboardPage::new(&snapshot, &state.form_defaults).render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render dashboard page: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn get_dashboard_data(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.snapshot().await)
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Form submission from the page. The run continues in the background and
/// the browser is sent back to the dashboard, which shows its progress.
pub async fn post_train(
    State(state): State<AppState>,
    Form(entries): Form<Vec<(String, String)>>,
) -> impl IntoResponse {
    match state.controller.begin_training().await {
        Ok(cycle) => {
            info!("Training submitted from dashboard");
            tokio::spawn(async move {
                let _ = cycle.run(&entries).await;
            });
            Redirect::to("/").into_response()
        }
        Err(e) => (
            StatusCode::CONFLICT,
            Json(json!({"status": "error", "message": e.to_string()})),
        )
            .into_response(),
    }
}
