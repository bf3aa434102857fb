//! API routing modules
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`users`] - registration, login, profile, points, favorites
//! - [`owners`] - owner accounts
//! - [`restaurants`] - listings and owner-side management
//! - [`menu_items`] - a la carte items
//! - [`special_menus`] - special offers
//! - [`special_menu_items`] - special menu composition
//! - [`coupons`] - coupon management and purchase
//! - [`reservations`] - reservation lifecycle
//! - [`testimonials`] - landing-page testimonials

pub mod coupons;
pub mod health;
pub mod menu_items;
pub mod owners;
pub mod reservations;
pub mod restaurants;
pub mod special_menu_items;
pub mod special_menus;
pub mod testimonials;
pub mod users;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
