//! Owner API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_owner;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/v1/owner", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/logout", get(handler::logout));

    let protected = Router::new()
        .route("/profile", get(handler::profile))
        .route("/update", patch(handler::update))
        .layer(middleware::from_fn_with_state(state.clone(), require_owner));

    public.merge(protected)
}
