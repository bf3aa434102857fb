//! Owner Model

use serde::{Deserialize, Serialize};

/// Restaurant owner account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub phone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public profile view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OwnerProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Create owner payload (password already hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Update owner payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}
