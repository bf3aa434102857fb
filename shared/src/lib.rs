//! Shared types for the Tavola platform
//!
//! Domain models used by the API server and any future companion
//! crates (CLI tooling, sync workers). Models derive `sqlx::FromRow`
//! behind the `db` feature so pure-model consumers stay lightweight.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
