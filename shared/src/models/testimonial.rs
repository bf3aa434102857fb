//! Testimonial Model

use serde::{Deserialize, Serialize};

/// Landing-page testimonial
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Testimonial {
    pub id: i64,
    pub message: String,
}
