use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod sources;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // The trainer UI is served from a different origin during development.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1", api_routes())
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(
                    middlewares::trace::trace_context_middleware,
                ))
                .layer(middleware::from_fn(
                    middlewares::metrics::metrics_middleware,
                ))
                .layer(cors),
        )
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/puzzles", puzzle_routes())
        .route("/slots/{slot}", get(handlers::puzzles::get_slot))
        .route("/attempts", post(handlers::progress::record_attempt))
        .route("/progress", get(handlers::progress::get_progress))
        .route("/activity", get(handlers::progress::get_activity))
        .route("/history", get(handlers::progress::get_history))
        .route("/themes", get(handlers::progress::get_themes))
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/notifications/stream",
            get(handlers::notifications::notification_stream),
        )
        .route(
            "/remote/dashboard",
            get(handlers::progress::remote_dashboard),
        )
        .route("/remote/activity", get(handlers::progress::remote_activity))
}

fn puzzle_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/daily", get(handlers::puzzles::daily_puzzle))
        .route("/next", get(handlers::puzzles::next_puzzle))
        .route("/theme/{theme}", get(handlers::puzzles::puzzle_by_theme))
        .route("/rating/{rating}", get(handlers::puzzles::puzzle_by_rating))
        .route("/{id}", get(handlers::puzzles::puzzle_by_id))
}
