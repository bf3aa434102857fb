//! Authentication middleware
//!
//! Axum middleware extracting the session cookie, validating the token,
//! and injecting the decoded identity into request extensions. Routers
//! attach [`require_user`] or [`require_owner`] on their protected
//! route groups.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::{CurrentOwner, CurrentUser, IdentityKind, JwtError};
use crate::auth::cookie;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Require a logged-in user session
///
/// Reads the `token` cookie, validates the JWT, and injects
/// [`CurrentUser`]. Any failure yields 401 and clears the cookie
/// (handled by [`AppError`]'s response mapping).
pub async fn require_user(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (id, email) = authenticate(&state, &req, IdentityKind::User)?;
    req.extensions_mut().insert(CurrentUser { id, email });
    Ok(next.run(req).await)
}

/// Require a logged-in owner session
pub async fn require_owner(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (id, email) = authenticate(&state, &req, IdentityKind::Owner)?;
    req.extensions_mut().insert(CurrentOwner { id, email });
    Ok(next.run(req).await)
}

fn authenticate(
    state: &ServerState,
    req: &Request,
    expected: IdentityKind,
) -> Result<(i64, String), AppError> {
    let Some(token) = cookie::token_from_headers(req.headers()) else {
        security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
        return Err(AppError::unauthorized());
    };

    let jwt_service = state.get_jwt_service();
    let claims = jwt_service.validate_token(&token).map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = format!("{}", e),
            uri = format!("{:?}", req.uri())
        );
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    claims.identity(expected).map_err(|e| {
        security_log!(
            "WARN",
            "auth_wrong_kind",
            error = format!("{}", e),
            uri = format!("{:?}", req.uri())
        );
        AppError::invalid_token("Invalid token")
    })
}
