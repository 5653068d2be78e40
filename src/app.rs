use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/signup", post(handlers::signup))
        .route("/api/login", post(handlers::login))
        .route("/api/user", get(handlers::get_user))
        .route("/api/logs", get(handlers::list_logs).post(handlers::create_log))
        .route("/api/logs/:id", put(handlers::update_log).delete(handlers::delete_log))
        .route(
            "/api/categories",
            get(handlers::get_categories).put(handlers::put_categories),
        )
        .route("/api/stats", get(handlers::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
