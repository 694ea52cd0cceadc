//! Data models
//!
//! Shared between the office server and the presentation layer.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod attachment;
pub mod auth;
pub mod cotisation;
pub mod depense;
pub mod localite;
pub mod membre;
pub mod reference;
pub mod role;
pub mod user;

// Re-exports
pub use attachment::*;
pub use auth::*;
pub use cotisation::*;
pub use depense::*;
pub use localite::*;
pub use membre::*;
pub use reference::*;
pub use role::*;
pub use user::*;
