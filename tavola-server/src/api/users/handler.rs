//! User API handlers

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::auth::{CurrentUser, IdentityKind, OAuthProvider, cookie, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::{favorite, password_reset, user};
use crate::utils::validation::validate_payload;
use crate::utils::{AppError, AppResult, ok_with_message};
use shared::models::{Restaurant, User, UserCreate, UserProfile, UserUpdate};

#[derive(serde::Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
}

#[derive(serde::Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(serde::Deserialize, Validate)]
pub struct UpdatePayload {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
}

/// POST /api/v1/user/register
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<Response> {
    validate_payload(&payload)?;

    if user::find_by_email(&state.pool, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::invalid("User already exists"));
    }

    let password_hash = hash_password(&payload.password)?;
    let created = user::create(
        &state.pool,
        &UserCreate {
            name: payload.name,
            email: payload.email,
            password: Some(password_hash),
            phone: payload.phone,
            google_id: None,
            facebook_id: None,
        },
    )
    .await?;

    send_verification_email(&state, &created).await?;

    let profile = user::profile_by_id(&state.pool, created.id)
        .await?
        .ok_or_else(|| AppError::internal("Registered user vanished"))?;

    Ok((
        StatusCode::CREATED,
        ok_with_message(profile, "User registered successfully"),
    )
        .into_response())
}

/// POST /api/v1/user/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Response> {
    validate_payload(&payload)?;

    let user = user::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;
    let Some(stored_hash) = &user.password else {
        // OAuth-only account
        return Err(AppError::invalid_credentials());
    };
    if !verify_password(&payload.password, stored_hash) {
        return Err(AppError::invalid_credentials());
    }

    issue_session(&state, user.id, &user.email)
}

/// GET /api/v1/user/logout
pub async fn logout() -> AppResult<Response> {
    let mut response =
        ok_with_message(json!({}), "Logged out successfully").into_response();
    let value = HeaderValue::from_str(&cookie::clear_auth_cookie())
        .map_err(|e| AppError::internal(format!("Cookie header build failed: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// GET /api/v1/user/auth/status
///
/// Reports whether the request carries a valid user session without
/// failing the request when it does not.
pub async fn auth_status(
    State(state): State<ServerState>,
    headers: axum::http::HeaderMap,
) -> Json<Value> {
    let authenticated = cookie::token_from_headers(&headers)
        .and_then(|token| state.jwt_service.validate_token(&token).ok())
        .and_then(|claims| claims.identity(IdentityKind::User).ok());

    match authenticated {
        Some((id, email)) => Json(json!({
            "authenticated": true,
            "user": { "id": id, "email": email }
        })),
        None => Json(json!({ "authenticated": false })),
    }
}

/// GET /api/v1/user/profile
pub async fn profile(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserProfile>> {
    let profile = user::profile_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(profile))
}

/// PATCH /api/v1/user/update
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UpdatePayload>,
) -> AppResult<Json<crate::utils::AppResponse<UserProfile>>> {
    validate_payload(&payload)?;

    if payload.name.is_none()
        && payload.email.is_none()
        && payload.password.is_none()
        && payload.phone.is_none()
    {
        return Err(AppError::invalid("No valid fields provided for update"));
    }

    let password_hash = match &payload.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let updated = user::update(
        &state.pool,
        current_user.id,
        &UserUpdate {
            name: payload.name,
            email: payload.email,
            password: password_hash,
            phone: payload.phone,
        },
    )
    .await?;

    Ok(ok_with_message(updated, "User updated successfully"))
}

/// GET /api/v1/user/points
pub async fn points(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Value>> {
    let points = user::loyalty_points(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(json!({ "loyalty_points": points })))
}

/// GET /api/v1/user/favorites
pub async fn favorites(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Restaurant>>> {
    let restaurants = favorite::find_for_user(&state.pool, current_user.id).await?;
    Ok(Json(restaurants))
}

#[derive(serde::Deserialize)]
pub struct TogglePayload {
    pub restaurant_id: i64,
}

/// POST /api/v1/user/favorites/toggle
pub async fn toggle_favorite(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<TogglePayload>,
) -> AppResult<Json<Value>> {
    let favorited = favorite::toggle(&state.pool, current_user.id, payload.restaurant_id).await?;
    Ok(Json(json!({ "favorited": favorited })))
}

// ── Email verification ───────────────────────────────────────

#[derive(serde::Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

/// GET /api/v1/user/verify-email?token=
pub async fn verify_email(
    State(state): State<ServerState>,
    Query(query): Query<VerifyQuery>,
) -> AppResult<Json<crate::utils::AppResponse<()>>> {
    let user_id = state
        .jwt_service
        .validate_email_token(&query.token)
        .map_err(|_| AppError::invalid("Invalid or expired verification link"))?;

    if !user::confirm_email(&state.pool, user_id).await? {
        return Err(AppError::not_found("User not found"));
    }

    Ok(ok_with_message((), "Email verified successfully"))
}

/// POST /api/v1/user/resend-verification
pub async fn resend_verification(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<crate::utils::AppResponse<()>>> {
    let user = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if user.confirmed_user {
        return Err(AppError::invalid("Email is already verified"));
    }

    send_verification_email(&state, &user).await?;
    Ok(ok_with_message((), "Verification email sent"))
}

// ── Password reset ───────────────────────────────────────────

#[derive(serde::Deserialize, Validate)]
pub struct ResetRequestPayload {
    #[validate(email, length(max = 254))]
    pub email: String,
}

/// POST /api/v1/user/password/reset/request
///
/// Always answers 200 so the endpoint cannot be used to probe which
/// emails exist.
pub async fn request_password_reset(
    State(state): State<ServerState>,
    Json(payload): Json<ResetRequestPayload>,
) -> AppResult<Json<crate::utils::AppResponse<()>>> {
    validate_payload(&payload)?;

    if let Some(user) = user::find_by_email(&state.pool, &payload.email).await? {
        let token = uuid::Uuid::new_v4().to_string();
        let now = shared::util::now_millis();
        password_reset::create_for_user(&state.pool, user.id, &hash_token(&token), now).await?;

        let reset_url = format!(
            "{}/reset-password?token={}",
            state.config.public_base_url, token
        );
        state.mailer.send_password_reset(&user.email, &reset_url).await?;
    }

    Ok(ok_with_message(
        (),
        "If the email exists, a reset link has been sent",
    ))
}

#[derive(serde::Deserialize)]
pub struct ResetTokenPayload {
    pub token: String,
}

/// POST /api/v1/user/password/reset/validate/token
pub async fn validate_reset_token(
    State(state): State<ServerState>,
    Json(payload): Json<ResetTokenPayload>,
) -> AppResult<Json<Value>> {
    let now = shared::util::now_millis();
    let valid =
        password_reset::is_valid_for_user(&state.pool, &hash_token(&payload.token), now).await?;
    Ok(Json(json!({ "valid": valid })))
}

#[derive(serde::Deserialize, Validate)]
pub struct ResetPasswordPayload {
    pub token: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// POST /api/v1/user/password/reset
pub async fn reset_password(
    State(state): State<ServerState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> AppResult<Json<crate::utils::AppResponse<()>>> {
    validate_payload(&payload)?;

    let now = shared::util::now_millis();
    let user_id = password_reset::consume_for_user(&state.pool, &hash_token(&payload.token), now)
        .await?
        .ok_or_else(|| AppError::invalid("Invalid or expired reset token"))?;

    let password_hash = hash_password(&payload.password)?;
    user::set_password(&state.pool, user_id, &password_hash).await?;

    Ok(ok_with_message((), "Password has been reset"))
}

// ── OAuth ────────────────────────────────────────────────────

#[derive(serde::Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
}

/// GET /api/v1/user/auth/{provider}/callback?code=
///
/// Exchanges the authorization code for an external profile, then logs
/// in the matching account, linking by email or creating a fresh,
/// pre-confirmed account when necessary.
pub async fn oauth_callback(
    State(state): State<ServerState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> AppResult<Response> {
    let provider = OAuthProvider::parse(&provider)
        .ok_or_else(|| AppError::invalid(format!("Unknown provider: {provider}")))?;

    let profile = state
        .oauth
        .exchange_code_for_profile(provider, &query.code)
        .await?;

    let existing = match provider {
        OAuthProvider::Google => {
            user::find_by_google_id(&state.pool, &profile.provider_user_id).await?
        }
        OAuthProvider::Facebook => {
            user::find_by_facebook_id(&state.pool, &profile.provider_user_id).await?
        }
    };

    let user = match existing {
        Some(user) => user,
        None => match user::find_by_email(&state.pool, &profile.email).await? {
            Some(user) => {
                // Same email, first time through this provider: link it
                match provider {
                    OAuthProvider::Google => {
                        user::link_google(&state.pool, user.id, &profile.provider_user_id).await?
                    }
                    OAuthProvider::Facebook => {
                        user::link_facebook(&state.pool, user.id, &profile.provider_user_id)
                            .await?
                    }
                };
                user
            }
            None => {
                let created = user::create(
                    &state.pool,
                    &UserCreate {
                        name: profile.name.clone(),
                        email: profile.email.clone(),
                        password: None,
                        phone: None,
                        google_id: (provider == OAuthProvider::Google)
                            .then(|| profile.provider_user_id.clone()),
                        facebook_id: (provider == OAuthProvider::Facebook)
                            .then(|| profile.provider_user_id.clone()),
                    },
                )
                .await?;
                // The provider vouches for the email address
                user::confirm_email(&state.pool, created.id).await?;
                created
            }
        },
    };

    issue_session(&state, user.id, &user.email)
}

// ── Internal helpers ─────────────────────────────────────────

fn issue_session(state: &ServerState, id: i64, email: &str) -> AppResult<Response> {
    let token = state
        .jwt_service
        .generate_token(id, email, IdentityKind::User)?;
    let max_age = state.jwt_service.config.expiration_minutes * 60;

    let mut response = ok_with_message(
        json!({ "id": id, "email": email }),
        "Login successful",
    )
    .into_response();
    let value = HeaderValue::from_str(&cookie::auth_cookie(&token, max_age))
        .map_err(|e| AppError::internal(format!("Cookie header build failed: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

async fn send_verification_email(state: &ServerState, user: &User) -> AppResult<()> {
    let token = state.jwt_service.generate_email_token(user.id, &user.email)?;
    let verify_url = format!(
        "{}/api/v1/user/verify-email?token={}",
        state.config.public_base_url, token
    );
    state.mailer.send_verification(&user.email, &verify_url).await
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
