//! Restaurant API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_owner;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/v1/restaurants", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // Discovery routes: public
    let public = Router::new()
        .route("/", get(handler::list_filtered))
        .route("/trending", get(handler::trending))
        .route("/discounted", get(handler::discounted))
        .route("/id/{id}", get(handler::get_by_id));

    // Management routes: restaurant owners only
    let manage = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", patch(handler::update).delete(handler::delete))
        .layer(middleware::from_fn_with_state(state.clone(), require_owner));

    public.merge(manage)
}
