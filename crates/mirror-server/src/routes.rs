//! Router

use crate::handlers::{self, route_not_found};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use tower_http::trace::TraceLayer;

/// `/users/` is the `/users/:id` shape with an empty id, handled by the same
/// lookups. Every method router carries the 404 fallback so that an unsupported
/// method answers like an unknown path instead of 405.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/load", get(handlers::load::load).fallback(route_not_found))
        .route(
            "/users",
            delete(handlers::users::purge)
                .put(handlers::users::create)
                .layer(DefaultBodyLimit::disable())
                .fallback(route_not_found),
        )
        .route(
            "/users/",
            get(handlers::users::get_blank)
                .delete(handlers::users::remove_blank)
                .fallback(route_not_found),
        )
        .route(
            "/users/:id",
            get(handlers::users::get)
                .delete(handlers::users::remove)
                .fallback(route_not_found),
        )
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
