//! Special Menu API handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::CurrentOwner;
use crate::core::ServerState;
use crate::db::repository::{restaurant, special_menu};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ok_with_message};
use shared::models::{SpecialMenu, SpecialMenuCreate};

/// GET /api/v1/special-menus/restaurant/{id}
pub async fn list_by_restaurant(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<Vec<SpecialMenu>>> {
    let menus = special_menu::find_by_restaurant(&state.pool, restaurant_id).await?;
    Ok(Json(menus))
}

/// POST /api/v1/special-menus
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(payload): Json<SpecialMenuCreate>,
) -> AppResult<Response> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.photo_url, "photo_url", MAX_URL_LEN)?;
    if payload.original_price < 0.0 || payload.discounted_price < 0.0 {
        return Err(AppError::validation("prices must not be negative"));
    }
    if !(0.0..=100.0).contains(&payload.discount_percentage) {
        return Err(AppError::validation(
            "discount_percentage must be between 0 and 100",
        ));
    }

    if !restaurant::verify_ownership(&state.pool, payload.restaurant_id, current_owner.id).await? {
        return Err(AppError::forbidden(
            "Forbidden - You do not own this restaurant",
        ));
    }

    let created = special_menu::create(&state.pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ok_with_message(created, "Special menu created successfully"),
    )
        .into_response())
}

/// DELETE /api/v1/special-menus/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Path(id): Path<i64>,
) -> AppResult<Json<crate::utils::AppResponse<()>>> {
    if !special_menu::verify_ownership(&state.pool, id, current_owner.id).await? {
        return Err(AppError::forbidden(
            "Forbidden - You do not own this restaurant",
        ));
    }

    if !special_menu::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Special menu not found"));
    }
    Ok(ok_with_message((), "Special menu deleted successfully"))
}
