//! Domain Models
//!
//! One module per table. Each module carries the entity struct plus the
//! Create/Update payloads consumed by the repository layer. Update
//! payloads are explicit patch objects: every updatable field is an
//! `Option<T>`, and the repository maps them onto a fixed column list.

// Accounts
pub mod owner;
pub mod user;

// Catalog
pub mod menu_item;
pub mod restaurant;
pub mod special_menu;

// Loyalty
pub mod coupon;

// Reservations
pub mod reservation;

// Misc
pub mod testimonial;

// Re-exports
pub use coupon::{Coupon, CouponCreate, CouponUpdate, PurchasedCoupon, UserCoupon};
pub use menu_item::{MenuItem, MenuItemCreate};
pub use owner::{Owner, OwnerCreate, OwnerProfile, OwnerUpdate};
pub use restaurant::{
    Restaurant, RestaurantCreate, RestaurantHighlight, RestaurantUpdate, RestaurantWithCoupons,
    SpecialMenuOffer,
};
pub use reservation::{
    Reservation, ReservationCreate, ReservationStatus, ReservationUpdateByOwner,
};
pub use special_menu::{SpecialMenu, SpecialMenuCreate, SpecialMenuItem, SpecialMenuItemLink};
pub use testimonial::Testimonial;
pub use user::{User, UserCreate, UserProfile, UserUpdate};
