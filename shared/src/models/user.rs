//! User Model

use serde::{Deserialize, Serialize};

/// Back-office account
///
/// `role_id` is the legacy single-role reference, still consulted by the
/// authorization resolver alongside the many-to-many assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role_id: Option<i64>,
    pub est_bloque: bool,
    /// Last login (Unix millis)
    pub dernier_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub role_id: Option<i64>,
}
