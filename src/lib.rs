pub mod bridge;
pub mod button;
pub mod cache;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod layout;
pub mod lifecycle;
pub mod message;
pub mod overlay;
pub mod page;
pub mod settings;
pub mod storage;
pub mod subtitle;

use crate::handlers::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_app(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/message", post(handlers::post_message))
        .route("/api/translate/{video_id}", get(handlers::translate))
        .route("/api/status/{video_id}", get(handlers::translation_status))
        .route(
            "/api/translation/{video_id}",
            axum::routing::delete(handlers::delete_translation),
        )
        .route("/api/health", get(handlers::server_health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
        )
        .with_state(app_state)
}
