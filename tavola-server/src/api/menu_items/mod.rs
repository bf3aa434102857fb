//! Menu Item API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_owner;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/v1/menu-items", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let public = Router::new().route("/restaurant/{id}", get(handler::list_by_restaurant));

    let manage = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn_with_state(state.clone(), require_owner));

    public.merge(manage)
}
