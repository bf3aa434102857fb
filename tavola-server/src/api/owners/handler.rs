//! Owner API handlers

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Extension, State},
};
use serde_json::json;
use validator::Validate;

use crate::auth::{CurrentOwner, IdentityKind, cookie, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::owner;
use crate::utils::validation::validate_payload;
use crate::utils::{AppError, AppResult, ok_with_message};
use shared::models::{OwnerCreate, OwnerProfile, OwnerUpdate};

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

/// POST /api/v1/owner/register
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<Response> {
    validate_payload(&payload)?;

    if owner::find_by_email(&state.pool, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::invalid("Owner already exists"));
    }

    let password_hash = hash_password(&payload.password)?;
    let created = owner::create(
        &state.pool,
        &OwnerCreate {
            name: payload.name,
            email: payload.email,
            password: password_hash,
            phone: payload.phone,
        },
    )
    .await?;

    let profile = owner::profile_by_id(&state.pool, created.id)
        .await?
        .ok_or_else(|| AppError::internal("Registered owner vanished"))?;

    Ok((
        StatusCode::CREATED,
        ok_with_message(profile, "Owner registered successfully"),
    )
        .into_response())
}

/// POST /api/v1/owner/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Response> {
    validate_payload(&payload)?;

    let owner = owner::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;
    if !verify_password(&payload.password, &owner.password) {
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(owner.id, &owner.email, IdentityKind::Owner)?;
    let max_age = state.jwt_service.config.expiration_minutes * 60;

    let mut response = ok_with_message(
        json!({ "id": owner.id, "email": owner.email }),
        "Login successful",
    )
    .into_response();
    let value = HeaderValue::from_str(&cookie::auth_cookie(&token, max_age))
        .map_err(|e| AppError::internal(format!("Cookie header build failed: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// GET /api/v1/owner/logout
pub async fn logout() -> AppResult<Response> {
    let mut response = ok_with_message(json!({}), "Logged out successfully").into_response();
    let value = HeaderValue::from_str(&cookie::clear_auth_cookie())
        .map_err(|e| AppError::internal(format!("Cookie header build failed: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// GET /api/v1/owner/profile
pub async fn profile(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
) -> AppResult<Json<OwnerProfile>> {
    let profile = owner::profile_by_id(&state.pool, current_owner.id)
        .await?
        .ok_or_else(|| AppError::not_found("Owner not found"))?;
    Ok(Json(profile))
}

/// PATCH /api/v1/owner/update
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(payload): Json<UpdatePayload>,
) -> AppResult<Json<crate::utils::AppResponse<OwnerProfile>>> {
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

    let updated = owner::update(
        &state.pool,
        current_owner.id,
        &OwnerUpdate {
            name: payload.name,
            email: payload.email,
            password: password_hash,
            phone: payload.phone,
        },
    )
    .await?;

    Ok(ok_with_message(updated, "Owner updated successfully"))
}
