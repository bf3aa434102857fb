//! Coupon Model

use serde::{Deserialize, Serialize};

/// Loyalty-point-funded discount coupon
///
/// Editing a coupon never touches existing purchases: a purchased coupon
/// keeps the terms it was bought under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: i64,
    pub restaurant_id: i64,
    pub description: String,
    pub discount_percentage: f64,
    pub required_points: i64,
    pub created_at: i64,
}

/// Create coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreate {
    pub restaurant_id: i64,
    pub description: String,
    pub discount_percentage: f64,
    pub required_points: i64,
}

/// Update coupon payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponUpdate {
    pub description: Option<String>,
    pub discount_percentage: Option<f64>,
    pub required_points: Option<i64>,
}

/// Purchase record for a (user, coupon) pair
///
/// `is_locked` is set while a pending reservation references the coupon;
/// `is_used` is set permanently once an owner confirms that reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PurchasedCoupon {
    pub id: i64,
    pub user_id: i64,
    pub coupon_id: i64,
    pub is_used: bool,
    pub is_locked: bool,
    pub purchased_at: i64,
}

/// Coupon joined with its purchase state (user-owned coupon listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserCoupon {
    pub id: i64,
    pub restaurant_id: i64,
    pub description: String,
    pub discount_percentage: f64,
    pub required_points: i64,
    pub is_used: bool,
    pub is_locked: bool,
    pub purchased_at: i64,
}
