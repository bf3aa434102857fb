//! Reservation API handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use chrono::Utc;
use serde_json::{Value, json};

use crate::auth::{CurrentOwner, CurrentUser};
use crate::core::ServerState;
use crate::db::repository::reservation::{self, ReservationFilter};
use crate::db::repository::user;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, PageQuery, Paginated, time};
use shared::models::{
    Reservation, ReservationCreate, ReservationStatus, ReservationUpdateByOwner,
};

/// GET /api/v1/reservations/user
pub async fn list_for_user(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = reservation::find_by_user(&state.pool, current_user.id).await?;
    Ok(Json(reservations))
}

#[derive(serde::Deserialize)]
pub struct FilterQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

impl FilterQuery {
    /// Resolve the whitelisted filter fields, rejecting unknown values
    fn filter(&self) -> AppResult<ReservationFilter> {
        let status = match &self.status {
            Some(raw) => Some(
                ReservationStatus::parse(raw)
                    .ok_or_else(|| AppError::validation(format!("Invalid status: {raw}")))?,
            ),
            None => None,
        };
        let date = match &self.date {
            Some(raw) => {
                time::parse_date(raw)?;
                Some(raw.clone())
            }
            None => None,
        };
        Ok(ReservationFilter { status, date })
    }

    fn page(&self) -> PageQuery {
        PageQuery::new(self.page, self.page_size)
    }
}

/// GET /api/v1/reservations/user/filtered?status&date&page&pageSize
pub async fn list_filtered_for_user(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<Paginated<Reservation>>> {
    let filter = query.filter()?;
    let page = query.page();

    let records = reservation::find_filtered_for_user(
        &state.pool,
        current_user.id,
        &filter,
        page.limit(),
        page.offset(),
    )
    .await?;
    let total =
        reservation::count_filtered_for_user(&state.pool, current_user.id, &filter).await?;
    Ok(Json(Paginated::new(records, page, total)))
}

/// GET /api/v1/reservations/filtered/owner?status&date&page&pageSize
pub async fn list_filtered_for_owner(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<Paginated<Reservation>>> {
    let filter = query.filter()?;
    let page = query.page();

    let records = reservation::find_filtered_for_owner(
        &state.pool,
        current_owner.id,
        &filter,
        page.limit(),
        page.offset(),
    )
    .await?;
    let total =
        reservation::count_filtered_for_owner(&state.pool, current_owner.id, &filter).await?;
    Ok(Json(Paginated::new(records, page, total)))
}

/// GET /api/v1/reservations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let reservation = reservation::find_by_id_for_user(&state.pool, id, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Reservation not found"))?;
    Ok(Json(reservation))
}

/// POST /api/v1/reservations
///
/// Requires a verified account. Coupon locking and the same-restaurant
/// reference check run inside the repository transaction.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<Response> {
    let account = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if !account.confirmed_user {
        return Err(AppError::unconfirmed());
    }

    time::parse_date(&payload.date)?;
    time::parse_time(&payload.time)?;
    if payload.guest_count < 1 {
        return Err(AppError::validation("guest_count must be at least 1"));
    }
    validate_optional_text(&payload.reservation_notes, "reservation_notes", MAX_NOTE_LEN)?;

    let now = shared::util::now_millis();
    let created = reservation::create(&state.pool, current_user.id, &payload, now).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

#[derive(serde::Deserialize)]
pub struct CancelPayload {
    pub reason: String,
}

/// POST /api/v1/reservations/cancel/{id}
///
/// Late cancellations (inside the two-hour window) cost the user
/// loyalty points; the penalty, status change, and coupon unlock are
/// one transaction in the repository.
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CancelPayload>,
) -> AppResult<Json<Reservation>> {
    if payload.reason.trim().is_empty() {
        return Err(AppError::validation("Cancellation reason is required"));
    }
    if payload.reason.len() > MAX_NOTE_LEN {
        return Err(AppError::validation("Cancellation reason is too long"));
    }

    let cancelled = reservation::cancel(
        &state.pool,
        id,
        current_user.id,
        payload.reason.trim(),
        state.business_tz(),
        Utc::now(),
    )
    .await?;
    Ok(Json(cancelled))
}

/// PATCH /api/v1/reservations/owner
pub async fn update_by_owner(
    State(state): State<ServerState>,
    Extension(current_owner): Extension<CurrentOwner>,
    Json(payload): Json<ReservationUpdateByOwner>,
) -> AppResult<Json<Reservation>> {
    validate_optional_text(
        &payload.cancellation_reason,
        "cancellation_reason",
        MAX_NOTE_LEN,
    )?;

    let now = shared::util::now_millis();
    let updated =
        reservation::update_by_owner(&state.pool, current_owner.id, &payload, now).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/reservations/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    if !reservation::delete(&state.pool, id, current_user.id).await? {
        return Err(AppError::not_found("Reservation not found"));
    }
    Ok(Json(json!({ "status": "Deleted" })))
}
