use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::runner::{RunError, RunReport, Runner};
use crate::scrape::types::Project;
use crate::store::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<Runner>,
    pub store: SnapshotStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/projects", get(projects))
        .route("/api/scrape", get(scrape))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Read-only view of the current snapshot. Never triggers a run.
async fn projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, (StatusCode, String)> {
    match state.store.load() {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            tracing::error!(error = ?e, "snapshot load failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))
        }
    }
}

/// On-demand trigger. Reports the added count, or a clear rejection
/// when a run is already in progress.
async fn scrape(
    State(state): State<AppState>,
) -> Result<Json<RunReport>, (StatusCode, String)> {
    match state.runner.try_run().await {
        Ok(report) => Ok(Json(report)),
        Err(RunError::Busy) => Err((
            StatusCode::CONFLICT,
            "a scrape is already in progress, try again later".to_string(),
        )),
        Err(e) => {
            tracing::error!(error = %e, "on-demand scrape failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
