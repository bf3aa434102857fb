//! User API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_user;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/v1/user", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // Public routes: registration, login, verification, resets, OAuth
    let public = Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/logout", get(handler::logout))
        .route("/verify-email", get(handler::verify_email))
        .route("/auth/status", get(handler::auth_status))
        .route("/auth/{provider}/callback", get(handler::oauth_callback))
        .route(
            "/password/reset/request",
            post(handler::request_password_reset),
        )
        .route(
            "/password/reset/validate/token",
            post(handler::validate_reset_token),
        )
        .route("/password/reset", post(handler::reset_password));

    // Session routes: require a valid user cookie
    let protected = Router::new()
        .route("/profile", get(handler::profile))
        .route("/update", patch(handler::update))
        .route("/points", get(handler::points))
        .route("/favorites", get(handler::favorites))
        .route("/favorites/toggle", post(handler::toggle_favorite))
        .route("/resend-verification", post(handler::resend_verification))
        .layer(middleware::from_fn_with_state(state.clone(), require_user));

    public.merge(protected)
}
