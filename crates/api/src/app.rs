use axum::{
    middleware,
    routing::{get, patch},
    Router,
};
use domain::repository::RequestRepository;
use domain::services::StageMachine;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{board, calendar, health, references, requests};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn RequestRepository>,
    pub config: Arc<Config>,
    pub stage_machine: StageMachine,
}

pub fn create_app(config: Config, repository: Arc<dyn RequestRepository>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        repository,
        config: config.clone(),
        stage_machine: StageMachine::default(),
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        // Board
        .route("/api/v1/board", get(board::get_board))
        .route(
            "/api/v1/requests/:request_id/stage",
            patch(board::change_stage),
        )
        // Calendar
        .route("/api/v1/calendar", get(calendar::get_month))
        .route("/api/v1/calendar/day", get(calendar::get_day))
        .route("/api/v1/calendar/upcoming", get(calendar::get_upcoming))
        // Requests
        .route(
            "/api/v1/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route(
            "/api/v1/requests/:request_id",
            get(requests::get_request)
                .put(requests::update_request)
                .delete(requests::delete_request),
        )
        // Reference data
        .route("/api/v1/references/:kind", get(references::list_references))
        .route(
            "/api/v1/equipment/:equipment_id/requests",
            get(references::equipment_history),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
