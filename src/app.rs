use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{collect, health, wait_times};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    // The dashboard frontend is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/wait-times", wait_times::router())
        .nest("/collect", collect::router())
        .layer(cors)
        .with_state(state)
}
