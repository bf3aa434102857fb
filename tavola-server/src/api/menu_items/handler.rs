//! Menu Item API handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};

use crate::auth::CurrentOwner;
use crate::core::ServerState;
use crate::db::repository::{menu_item, restaurant};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ok_with_message};
use shared::models::{MenuItem, MenuItemCreate};

/// GET /api/v1/menu-items/restaurant/{id}
pub async fn list_by_restaurant(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let items = menu_item::find_by_restaurant(&state.pool, restaurant_id).await?;
    Ok(Json(items))
}

/// POST /api/v1/menu-items
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Response> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if payload.price < 0.0 {
        return Err(AppError::validation("price must not be negative"));
    }

    if !restaurant::verify_ownership(&state.pool, payload.restaurant_id, current_owner.id).await? {
        return Err(AppError::forbidden(
            "Forbidden - You do not own this restaurant",
        ));
    }

    let created = menu_item::create(&state.pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ok_with_message(created, "Menu item created successfully"),
    )
        .into_response())
}

#[derive(serde::Deserialize)]
pub struct DeleteQuery {
    pub restaurant_id: i64,
}

/// DELETE /api/v1/menu-items/{id}?restaurant_id=
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Path(id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<Json<crate::utils::AppResponse<()>>> {
    if !restaurant::verify_ownership(&state.pool, query.restaurant_id, current_owner.id).await? {
        return Err(AppError::forbidden(
            "Forbidden - You do not own this restaurant",
        ));
    }

    if !menu_item::delete(&state.pool, id, query.restaurant_id).await? {
        return Err(AppError::not_found("Menu item not found"));
    }
    Ok(ok_with_message((), "Menu item deleted successfully"))
}
