//! Role Model

use serde::{Deserialize, Serialize};

/// Slug of the reserved administrator role
pub const ADMIN_ROLE_SLUG: &str = "admin";

/// Permission key granting every permission
pub const ADMIN_PERMISSION: &str = "admin";

/// Role entity (named permission set)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub nom: String,
    /// URL-safe unique key derived from `nom`
    pub slug: String,
    pub description: Option<String>,
    /// JSON array of permission keys (e.g. ["membres.view", "cotisations.create"])
    #[cfg_attr(feature = "db", sqlx(json))]
    pub permissions: Vec<String>,
    pub actif: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Role {
    pub fn is_admin_slug(&self) -> bool {
        self.slug == ADMIN_ROLE_SLUG
    }

    /// Whether the explicit permission set lists `key` (active flag not considered)
    pub fn lists(&self, key: &str) -> bool {
        self.permissions.iter().any(|p| p == key)
    }
}

/// Create role payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleCreate {
    pub nom: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Defaults to active when omitted
    pub actif: Option<bool>,
}

/// Update role payload (replaces every field, slug follows the new name)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub nom: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Reset to active when omitted
    pub actif: Option<bool>,
}

/// Role with the number of users holding it (list view)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RoleWithUserCount {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub role: Role,
    pub user_count: i64,
}
