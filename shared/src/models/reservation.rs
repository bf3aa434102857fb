//! Reservation Model

use serde::{Deserialize, Serialize};

/// Reservation lifecycle state
///
/// Implemented transitions: `pending -> confirmed` (owner) and
/// `pending -> cancelled` (user or owner). `seated` and `completed`
/// are accepted schema values reserved for future use; nothing
/// transitions into them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Seated,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Seated => "seated",
            ReservationStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" => Some(ReservationStatus::Confirmed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            "seated" => Some(ReservationStatus::Seated),
            "completed" => Some(ReservationStatus::Completed),
            _ => None,
        }
    }

    /// Terminal states cannot be patched further
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Confirmed
                | ReservationStatus::Cancelled
                | ReservationStatus::Completed
        )
    }
}

/// Table reservation
///
/// `date` is `YYYY-MM-DD`, `time` is `HH:MM`, both in the business
/// timezone; they are combined into a UTC instant only when the
/// cancellation-penalty window is evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub date: String,
    pub time: String,
    pub guest_count: i64,
    pub status: ReservationStatus,
    pub special_menu_id: Option<i64>,
    pub coupon_id: Option<i64>,
    pub cancellation_reason: Option<String>,
    pub reservation_notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create reservation payload (user_id comes from the session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub restaurant_id: i64,
    pub date: String,
    pub time: String,
    pub guest_count: i64,
    pub special_menu_id: Option<i64>,
    pub coupon_id: Option<i64>,
    pub reservation_notes: Option<String>,
}

/// Owner-side status patch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationUpdateByOwner {
    pub reservation_id: i64,
    pub status: ReservationStatus,
    pub cancellation_reason: Option<String>,
}
