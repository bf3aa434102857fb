//! User Model

use serde::{Deserialize, Serialize};

/// User account (diner)
///
/// `loyalty_points` is a non-negative balance funded by completed visits
/// and spent on coupon purchases or late-cancellation penalties.
/// `confirmed_user` gates reservations and purchases until the email
/// address is verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2 hash; absent for OAuth-only accounts
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
    pub loyalty_points: i64,
    pub confirmed_user: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public profile view (never exposes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub loyalty_points: i64,
    pub confirmed_user: bool,
}

/// Create user payload (password already hashed by the caller)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Argon2 hash; hashing happens before this struct is built
    pub password: Option<String>,
    pub phone: Option<String>,
}
