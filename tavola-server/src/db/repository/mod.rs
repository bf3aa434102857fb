//! Repository Module
//!
//! Parameterized CRUD and transactional operations, one module per
//! aggregate. Handlers convert [`RepoError`] into HTTP responses via
//! `AppError`; raw database errors never cross that boundary.

// Accounts
pub mod owner;
pub mod password_reset;
pub mod user;

// Catalog
pub mod menu_item;
pub mod restaurant;
pub mod special_menu;

// Loyalty
pub mod coupon;
pub mod favorite;

// Reservations
pub mod reservation;

// Misc
pub mod testimonial;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Business rule: {0}")]
    BusinessRule(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RepoError::Duplicate("Row already exists".into());
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::BusinessRule("Referenced row does not exist".into());
            }
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
