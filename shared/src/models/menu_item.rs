//! Menu Item Model

use serde::{Deserialize, Serialize};

/// A la carte menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub price: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Percentage discount currently applied to this item, if any
    pub discount: Option<f64>,
    pub created_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub restaurant_id: i64,
    pub name: String,
    pub price: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub discount: Option<f64>,
}
