//! Member Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `statut` value for an active member
pub const MEMBRE_ACTIF: i32 = 0;
/// `statut` value for an inactive member
pub const MEMBRE_INACTIF: i32 = 1;

/// Member entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Membre {
    pub id: i64,
    /// Linked back-office account, if any
    pub utilisateur_id: Option<i64>,
    pub nom: String,
    pub prenom: String,
    pub telephone: Option<String>,
    pub localite_id: Option<i64>,
    /// Blob store path of the member photo
    pub photo_url: Option<String>,
    pub adresse: Option<String>,
    pub date_adhesion: Option<NaiveDate>,
    /// 0 = active, 1 = inactive
    pub statut: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Membre {
    pub fn is_active(&self) -> bool {
        self.statut == MEMBRE_ACTIF
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}

/// Create member payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembreCreate {
    pub nom: String,
    pub prenom: String,
    pub telephone: Option<String>,
    pub localite_id: Option<i64>,
    pub photo_url: Option<String>,
    pub adresse: Option<String>,
    pub date_adhesion: Option<NaiveDate>,
    pub statut: Option<i32>,
    pub utilisateur_id: Option<i64>,
}

/// Update member payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembreUpdate {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub telephone: Option<String>,
    pub localite_id: Option<i64>,
    pub photo_url: Option<String>,
    pub adresse: Option<String>,
    pub date_adhesion: Option<NaiveDate>,
    pub statut: Option<i32>,
    pub utilisateur_id: Option<i64>,
}

/// Member with locality label (list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MembreWithLocalite {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub membre: Membre,
    pub localite_libelle: Option<String>,
}

/// Member listing row with dues and expense totals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MembreSummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub membre: MembreWithLocalite,
    pub total_cotisations: f64,
    /// Sum of effective expense amounts
    pub total_depenses: f64,
}

/// Member listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembreFilters {
    /// Substring of first name, last name or phone
    pub search: Option<String>,
    pub localite_id: Option<i64>,
}
