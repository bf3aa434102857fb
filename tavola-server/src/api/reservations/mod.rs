//! Reservation API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{require_owner, require_user};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/v1/reservations", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // User-side lifecycle
    let user_routes = Router::new()
        .route("/user", get(handler::list_for_user))
        .route("/user/filtered", get(handler::list_filtered_for_user))
        .route("/", post(handler::create))
        .route("/cancel/{id}", post(handler::cancel))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .layer(middleware::from_fn_with_state(state.clone(), require_user));

    // Owner-side confirmation/cancellation and listing
    let owner_routes = Router::new()
        .route("/owner", patch(handler::update_by_owner))
        .route("/filtered/owner", get(handler::list_filtered_for_owner))
        .layer(middleware::from_fn_with_state(state.clone(), require_owner));

    user_routes.merge(owner_routes)
}
