mod error;
pub mod user_groups;

use axum::{Router, routing::post};
pub use error::AdminError;

use crate::{AppState, middleware::admin_auth_middleware};

/// User group administration routes, mounted under `/api/user_groups`.
pub fn user_group_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/create", post(user_groups::create))
        .route("/update", post(user_groups::update))
        .route("/delete", post(user_groups::delete))
        .route("/add_user", post(user_groups::add_user))
        .route("/remove_user", post(user_groups::remove_user))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}
