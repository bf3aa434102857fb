//! Coupon API module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::auth::{require_owner, require_user};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/v1/coupons", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // User-side routes: browse, purchase, list owned
    let user_routes = Router::new()
        .route("/available", get(handler::available))
        .route("/ownedByUser", get(handler::owned_by_user))
        .route("/purchase", post(handler::purchase))
        .route(
            "/purchased/restaurants",
            get(handler::purchased_restaurants),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_user));

    // Owner-side routes: manage a restaurant's coupons
    let owner_routes = Router::new()
        .route("/creation", post(handler::create))
        .route("/edit", patch(handler::edit))
        .route("/delete", delete(handler::delete))
        .layer(middleware::from_fn_with_state(state.clone(), require_owner));

    user_routes.merge(owner_routes)
}
