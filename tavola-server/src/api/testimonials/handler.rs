//! Testimonials API handlers

use axum::{
    Json,
    extract::{Query, State},
};

use crate::core::ServerState;
use crate::db::repository::testimonial;
use crate::utils::{AppResult, PageQuery, Paginated};
use shared::models::Testimonial;

/// GET /api/v1/testimonials?page&pageSize
pub async fn list(
    State(state): State<ServerState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Paginated<Testimonial>>> {
    let records = testimonial::find_page(&state.pool, page.limit(), page.offset()).await?;
    let total = testimonial::count(&state.pool).await?;
    Ok(Json(Paginated::new(records, page, total)))
}
