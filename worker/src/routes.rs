use crate::controller::fcm::routes::FcmRoutes;
use crate::controller::health::routes::HealthRoutes;
use crate::state::AppState;
use axum::Router;
use axum_tracing_opentelemetry::middleware::OtelAxumLayer;
use tower_http::catch_panic::CatchPanicLayer;

pub struct Routes;

impl Routes {
    pub async fn routes(app_state: &AppState) -> Router {
        Router::new()
            .nest("/health", HealthRoutes::routes(app_state.clone()))
            .nest("/api/fcm", FcmRoutes::routes(app_state.clone()))
            .layer(CatchPanicLayer::new())
            .layer(OtelAxumLayer::default())
    }
}
