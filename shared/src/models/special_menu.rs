//! Special Menu Model

use serde::{Deserialize, Serialize};

/// Fixed-price special offer composed of existing menu items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SpecialMenu {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub original_price: f64,
    pub discounted_price: f64,
    pub discount_percentage: f64,
    pub photo_url: Option<String>,
    pub availability: bool,
    pub created_at: i64,
}

/// Create special menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialMenuCreate {
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub original_price: f64,
    pub discounted_price: f64,
    pub discount_percentage: f64,
    pub photo_url: Option<String>,
    pub availability: Option<bool>,
}

/// Link row between a special menu and a menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SpecialMenuItem {
    pub id: i64,
    pub special_menu_id: i64,
    pub menu_item_id: i64,
}

/// Create/delete payload for the link row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialMenuItemLink {
    pub special_menu_id: i64,
    pub menu_item_id: i64,
}
