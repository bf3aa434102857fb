//! Restaurant API handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};

use crate::auth::CurrentOwner;
use crate::core::ServerState;
use crate::db::repository::restaurant::{self, RestaurantFilter};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, PageQuery, Paginated, ok_with_message};
use shared::models::{
    Restaurant, RestaurantCreate, RestaurantHighlight, RestaurantUpdate, SpecialMenuOffer,
};

/// Whitelisted filter + pagination query parameters
#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub rating: Option<f64>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// GET /api/v1/restaurants - filtered, paginated listing
pub async fn list_filtered(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<Restaurant>>> {
    let filter = RestaurantFilter {
        name: query.name,
        cuisine: query.cuisine,
        location: query.location,
        min_rating: query.rating,
    };
    let page = PageQuery::new(query.page, query.page_size);

    let records =
        restaurant::find_filtered(&state.pool, &filter, page.limit(), page.offset()).await?;
    let total = restaurant::count_filtered(&state.pool, &filter).await?;
    Ok(Json(Paginated::new(records, page, total)))
}

/// GET /api/v1/restaurants/trending - top rated, with latest offers
pub async fn trending(
    State(state): State<ServerState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Paginated<RestaurantHighlight>>> {
    let records = restaurant::find_trending(&state.pool, page.limit(), page.offset()).await?;
    let total = restaurant::count_all(&state.pool).await?;
    Ok(Json(Paginated::new(records, page, total)))
}

/// GET /api/v1/restaurants/discounted - latest special menus with restaurants
pub async fn discounted(
    State(state): State<ServerState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Paginated<SpecialMenuOffer>>> {
    let records = restaurant::find_discounted(&state.pool, page.limit(), page.offset()).await?;
    let total = restaurant::count_special_menus(&state.pool).await?;
    Ok(Json(Paginated::new(records, page, total)))
}

/// GET /api/v1/restaurants/id/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    let restaurant = restaurant::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant not found"))?;
    Ok(Json(restaurant))
}

/// POST /api/v1/restaurants - create a restaurant for the acting owner
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(payload): Json<RestaurantCreate>,
) -> AppResult<Response> {
    validate_restaurant_create(&payload)?;

    let created = restaurant::create(&state.pool, current_owner.id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ok_with_message(created, "Restaurant created successfully"),
    )
        .into_response())
}

/// PATCH /api/v1/restaurants/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Path(id): Path<i64>,
    Json(payload): Json<RestaurantUpdate>,
) -> AppResult<Json<crate::utils::AppResponse<Restaurant>>> {
    validate_restaurant_update(&payload)?;

    let updated = restaurant::update(&state.pool, id, current_owner.id, &payload).await?;
    Ok(ok_with_message(updated, "Restaurant updated successfully"))
}

/// DELETE /api/v1/restaurants/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Path(id): Path<i64>,
) -> AppResult<Json<crate::utils::AppResponse<()>>> {
    if !restaurant::delete(&state.pool, id, current_owner.id).await? {
        return Err(AppError::not_found(
            "Restaurant not found or not authorized",
        ));
    }
    Ok(ok_with_message((), "Restaurant deleted successfully"))
}

fn validate_restaurant_create(payload: &RestaurantCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.location, "location", MAX_ADDRESS_LEN)?;
    validate_required_text(&payload.cuisine, "cuisine", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.opening_hours, "opening_hours", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.contact, "contact", MAX_URL_LEN)?;
    Ok(())
}

fn validate_restaurant_update(payload: &RestaurantUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(location) = &payload.location {
        validate_required_text(location, "location", MAX_ADDRESS_LEN)?;
    }
    if let Some(cuisine) = &payload.cuisine {
        validate_required_text(cuisine, "cuisine", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(rating) = payload.rating
        && !(0.0..=5.0).contains(&rating)
    {
        return Err(AppError::validation("rating must be between 0 and 5"));
    }
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.opening_hours, "opening_hours", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.contact, "contact", MAX_URL_LEN)?;
    Ok(())
}
