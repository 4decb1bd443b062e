use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route(
            "/api/meals",
            get(handlers::get_meals).post(handlers::post_meals),
        )
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
