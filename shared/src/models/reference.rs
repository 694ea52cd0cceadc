//! Reference lists (payment statuses, payment modes, expense categories)

use serde::{Deserialize, Serialize};

/// Dues payment status (e.g. "Payé", "En attente")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StatutCotisation {
    pub id: i64,
    pub libelle: String,
    pub description: Option<String>,
}

/// Payment mode (cash, mobile money, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ModePaiement {
    pub id: i64,
    pub libelle: String,
    pub actif: bool,
}

/// Medical expense category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CategorieDepense {
    pub id: i64,
    pub libelle: String,
    pub description: Option<String>,
    pub actif: bool,
}
