//! Health check endpoint

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// GET /health - liveness + database reachability
async fn health(State(state): State<ServerState>) -> AppResult<Json<Value>> {
    sqlx::query("SELECT 1").execute(&state.pool).await.map_err(
        |e| crate::utils::AppError::database(format!("Health check query failed: {e}")),
    )?;
    Ok(Json(json!({ "status": "ok", "database": "ok" })))
}
