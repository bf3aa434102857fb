//! Special Menu Item (link row) API module

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::require_owner;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/v1/special-menu-items", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).delete(handler::delete))
        .layer(middleware::from_fn_with_state(state.clone(), require_owner))
}
