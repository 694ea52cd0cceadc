//! Locality Model

use serde::{Deserialize, Serialize};

/// Locality (geographic grouping of members)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Localite {
    pub id: i64,
    pub libelle: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaliteCreate {
    pub libelle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaliteUpdate {
    pub libelle: Option<String>,
}
