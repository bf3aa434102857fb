//! Coupon API handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Extension, Query, State},
};
use validator::Validate;

use crate::auth::{CurrentOwner, CurrentUser};
use crate::core::ServerState;
use crate::db::repository::{coupon, restaurant, user};
use crate::utils::validation::validate_payload;
use crate::utils::{AppError, AppResult, PageQuery, Paginated, ok_with_message};
use shared::models::{
    Coupon, CouponCreate, CouponUpdate, PurchasedCoupon, RestaurantWithCoupons, UserCoupon,
};

#[derive(serde::Deserialize)]
pub struct AvailableQuery {
    pub restaurant_id: Option<i64>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// GET /api/v1/coupons/available?restaurant_id&page&pageSize
pub async fn available(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<AvailableQuery>,
) -> AppResult<Json<Paginated<Coupon>>> {
    let restaurant_id = query
        .restaurant_id
        .ok_or_else(|| AppError::invalid("restaurant_id is required"))?;
    let page = PageQuery::new(query.page, query.page_size);

    let records = coupon::find_available(
        &state.pool,
        restaurant_id,
        current_user.id,
        page.limit(),
        page.offset(),
    )
    .await?;
    let total = coupon::count_available(&state.pool, restaurant_id, current_user.id).await?;
    Ok(Json(Paginated::new(records, page, total)))
}

/// GET /api/v1/coupons/ownedByUser?page&pageSize
pub async fn owned_by_user(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Paginated<UserCoupon>>> {
    let records =
        coupon::find_user_coupons(&state.pool, current_user.id, page.limit(), page.offset())
            .await?;
    let total = coupon::count_user_coupons(&state.pool, current_user.id).await?;
    Ok(Json(Paginated::new(records, page, total)))
}

#[derive(serde::Deserialize)]
pub struct PurchasePayload {
    pub coupon_id: i64,
}

/// POST /api/v1/coupons/purchase
///
/// Point debit and purchase insert happen atomically in the
/// repository; here only the confirmed-account gate applies.
pub async fn purchase(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PurchasePayload>,
) -> AppResult<Response> {
    let account = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if !account.confirmed_user {
        return Err(AppError::unconfirmed());
    }

    let now = shared::util::now_millis();
    let purchased: PurchasedCoupon =
        coupon::purchase(&state.pool, current_user.id, payload.coupon_id, now).await?;
    Ok((StatusCode::CREATED, Json(purchased)).into_response())
}

/// GET /api/v1/coupons/purchased/restaurants
pub async fn purchased_restaurants(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<RestaurantWithCoupons>>> {
    let records = restaurant::find_with_purchased_coupons(&state.pool, current_user.id).await?;
    Ok(Json(records))
}

// ── Owner-side management ────────────────────────────────────

#[derive(serde::Deserialize, Validate)]
pub struct CreatePayload {
    pub restaurant_id: i64,
    #[validate(length(min = 3, max = 255))]
    pub description: String,
    #[validate(range(min = 1.0, max = 100.0))]
    pub discount_percentage: f64,
    #[validate(range(min = 0))]
    pub required_points: i64,
}

/// POST /api/v1/coupons/creation
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(payload): Json<CreatePayload>,
) -> AppResult<Response> {
    validate_payload(&payload)?;

    if !restaurant::verify_ownership(&state.pool, payload.restaurant_id, current_owner.id).await? {
        return Err(AppError::forbidden(
            "Forbidden - You do not own this restaurant",
        ));
    }

    let created = coupon::create(
        &state.pool,
        &CouponCreate {
            restaurant_id: payload.restaurant_id,
            description: payload.description,
            discount_percentage: payload.discount_percentage,
            required_points: payload.required_points,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        ok_with_message(created, "Coupon created successfully"),
    )
        .into_response())
}

#[derive(serde::Deserialize, Validate)]
pub struct EditPayload {
    pub coupon_id: i64,
    #[validate(length(min = 3, max = 255))]
    pub description: Option<String>,
    #[validate(range(min = 1.0, max = 100.0))]
    pub discount_percentage: Option<f64>,
    #[validate(range(min = 0))]
    pub required_points: Option<i64>,
}

/// PATCH /api/v1/coupons/edit
///
/// Edits never touch existing purchases.
pub async fn edit(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(payload): Json<EditPayload>,
) -> AppResult<Json<crate::utils::AppResponse<Coupon>>> {
    validate_payload(&payload)?;

    if !coupon::verify_ownership(&state.pool, payload.coupon_id, current_owner.id).await? {
        return Err(AppError::forbidden(
            "Forbidden - You do not own this restaurant",
        ));
    }

    let updated = coupon::update(
        &state.pool,
        payload.coupon_id,
        &CouponUpdate {
            description: payload.description,
            discount_percentage: payload.discount_percentage,
            required_points: payload.required_points,
        },
    )
    .await?;
    Ok(ok_with_message(updated, "Coupon updated successfully"))
}

#[derive(serde::Deserialize)]
pub struct DeletePayload {
    pub coupon_id: i64,
}

/// DELETE /api/v1/coupons/delete
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(payload): Json<DeletePayload>,
) -> AppResult<Json<crate::utils::AppResponse<()>>> {
    if !coupon::verify_ownership(&state.pool, payload.coupon_id, current_owner.id).await? {
        return Err(AppError::forbidden(
            "Forbidden - You do not own this restaurant",
        ));
    }

    if !coupon::delete(&state.pool, payload.coupon_id).await? {
        return Err(AppError::not_found("Coupon not found"));
    }
    Ok(ok_with_message((), "Coupon deleted successfully"))
}
