//! Restaurant Model

use serde::{Deserialize, Serialize};

use super::{Coupon, SpecialMenu};

/// Restaurant listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub location: String,
    pub cuisine: String,
    pub rating: f64,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub opening_hours: Option<String>,
    pub contact: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create restaurant payload (owner_id comes from the session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub location: String,
    pub cuisine: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub opening_hours: Option<String>,
    pub contact: Option<String>,
}

/// Update restaurant payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub cuisine: Option<String>,
    pub rating: Option<f64>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub opening_hours: Option<String>,
    pub contact: Option<String>,
}

/// Restaurant with its latest special menu and coupon (trending feed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantHighlight {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub special_menus: Option<SpecialMenu>,
    pub coupons: Option<Coupon>,
}

/// Special menu joined with its restaurant (discounted feed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialMenuOffer {
    #[serde(flatten)]
    pub special_menu: SpecialMenu,
    pub restaurant: Restaurant,
}

/// Restaurant with the caller's purchased coupons and its special menus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantWithCoupons {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub coupons: Vec<Coupon>,
    pub special_menus: Vec<SpecialMenu>,
}
