pub mod error;
pub mod listeners;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Event triggers (presence substrate, status change feed)
    let trigger_routes = Router::new()
        .route("/presence/{uid}", post(routes::trigger::presence))
        .route("/status/{user_id}", post(routes::trigger::status));

    let api = Router::new()
        .nest("/trigger", trigger_routes)
        .route("/presence/{uid}", put(routes::trigger::set_presence));

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
