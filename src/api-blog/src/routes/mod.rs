use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use core_blog::health_check;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::state::AppState;

pub mod logging_middleware;
pub mod posts;

//
// Router
//

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    // Public auth routes (no session required)
    let auth_routes = Router::new()
        .route("/api/register", post(auth::post_register))
        .route("/api/login", post(auth::post_login))
        .route("/api/logout", post(auth::post_logout));

    // Routes that need a resolved user
    let session_routes = Router::new()
        .route("/{user_id}/", get(auth::get_home))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    // Post CRUD (no authorization applied)
    let post_routes = Router::new()
        .route("/api/post", post(posts::create_post).get(posts::list_posts))
        .route(
            "/api/post/{id}",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        );

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes)
        .merge(session_routes)
        .merge(post_routes)
        .with_state(state)
        // Bound every request; a hung store call answers 408
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        // Custom route access logging
        .layer(middleware::from_fn(logging_middleware::log_route_access))
        // Tracing middleware
        .layer(TraceLayer::new_for_http())
}
