//! Medical Expense Model (dépenses médicales)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Medical expense reimbursement
///
/// `montant_total` is derived on every write as `montant + transport`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DepenseMedicale {
    pub id: i64,
    pub membre_id: i64,
    pub categorie_depense_id: i64,
    pub description: String,
    pub montant: f64,
    pub date_depense: NaiveDate,
    pub nom_prestataire: Option<String>,
    pub personne_deleguee: Option<String>,
    /// Transport paid to the delegate
    pub transport_pers_deleguee: Option<f64>,
    pub montant_total: Option<f64>,
    /// Recording user
    pub utilisateur_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DepenseMedicale {
    /// Amount counted in totals: the derived total when present, else the
    /// base amount (never both)
    pub fn effective_amount(&self) -> f64 {
        self.montant_total.unwrap_or(self.montant)
    }
}

/// Create/update expense payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepenseInput {
    pub membre_id: i64,
    pub categorie_depense_id: i64,
    pub description: String,
    pub montant: f64,
    pub date_depense: Option<NaiveDate>,
    pub nom_prestataire: Option<String>,
    pub nom_delegue: Option<String>,
    pub montant_transport: Option<f64>,
}

/// Expense joined with member, locality and category labels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DepenseDetail {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub depense: DepenseMedicale,
    pub membre_nom: String,
    pub membre_prenom: String,
    pub localite_id: Option<i64>,
    pub localite_libelle: Option<String>,
    pub categorie_libelle: Option<String>,
}

/// Expense listing filters (year and month as submitted)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepenseFilters {
    pub membre_id: Option<i64>,
    pub localite_id: Option<i64>,
    pub annee: Option<String>,
    pub mois: Option<String>,
}
