use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::debug;

pub struct HealthRoutes;

impl HealthRoutes {
    pub fn routes(app_state: AppState) -> Router {
        Router::new().route("/", get(health_handler)).with_state(app_state)
    }
}

async fn health_handler(State(app_state): State<AppState>) -> Json<Value> {
    debug!("GET /health");
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "pendingScheduled": app_state.scheduler.pending_len(),
    }))
}
