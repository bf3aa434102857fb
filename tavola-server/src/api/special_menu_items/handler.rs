//! Special Menu Item API handlers
//!
//! Link rows between a special menu and its menu items. Ownership of
//! the special menu's restaurant is re-verified on every write, and a
//! link may only reference a menu item of the same restaurant.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Extension, State},
};

use crate::auth::CurrentOwner;
use crate::core::ServerState;
use crate::db::repository::{menu_item, special_menu};
use crate::utils::{AppError, AppResult, ok_with_message};
use shared::models::SpecialMenuItemLink;

/// POST /api/v1/special-menu-items
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(link): Json<SpecialMenuItemLink>,
) -> AppResult<Response> {
    let special_menu = authorize(&state, &link, current_owner.id).await?;

    let item = menu_item::find_by_id(&state.pool, link.menu_item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Menu item not found"))?;
    if item.restaurant_id != special_menu.restaurant_id {
        return Err(AppError::business_rule(
            "Menu item does not belong to this restaurant",
        ));
    }

    let created = special_menu::add_item(&state.pool, &link).await?;
    Ok((
        StatusCode::CREATED,
        ok_with_message(created, "Menu item added to special menu"),
    )
        .into_response())
}

/// DELETE /api/v1/special-menu-items
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(link): Json<SpecialMenuItemLink>,
) -> AppResult<Json<crate::utils::AppResponse<()>>> {
    authorize(&state, &link, current_owner.id).await?;

    if !special_menu::remove_item(&state.pool, &link).await? {
        return Err(AppError::not_found("Link not found"));
    }
    Ok(ok_with_message((), "Menu item removed from special menu"))
}

async fn authorize(
    state: &ServerState,
    link: &SpecialMenuItemLink,
    owner_id: i64,
) -> AppResult<shared::models::SpecialMenu> {
    if !special_menu::verify_ownership(&state.pool, link.special_menu_id, owner_id).await? {
        return Err(AppError::forbidden(
            "Forbidden - You do not own this restaurant",
        ));
    }
    special_menu::find_by_id(&state.pool, link.special_menu_id)
        .await?
        .ok_or_else(|| AppError::not_found("Special menu not found"))
}
