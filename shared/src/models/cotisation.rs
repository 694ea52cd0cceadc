//! Dues Model (cotisations)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One member's dues payment for a (year, month)
///
/// `(membre_id, annee, mois)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cotisation {
    pub id: i64,
    pub membre_id: i64,
    pub montant: f64,
    pub annee: i32,
    /// 1..=12
    pub mois: i32,
    pub date_paiement: Option<NaiveDate>,
    pub mode_paiement_id: Option<i64>,
    pub statut_cotisation_id: Option<i64>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    /// Recording user
    pub enregistre_par: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Dues submission (single form or one line of a bulk sheet)
///
/// Year and month arrive as strings ("2024", "03") and are normalized on
/// validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CotisationInput {
    pub membre_id: i64,
    pub montant: f64,
    pub annee: String,
    pub mois: String,
    pub date_paiement: Option<NaiveDate>,
    pub mode_paiement_id: Option<i64>,
    pub statut_cotisation_id: Option<i64>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Dues record joined with member, locality, status and mode labels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CotisationDetail {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub cotisation: Cotisation,
    pub membre_nom: String,
    pub membre_prenom: String,
    pub localite_id: Option<i64>,
    pub localite_libelle: Option<String>,
    pub statut_libelle: Option<String>,
    pub mode_libelle: Option<String>,
}

/// Dues listing filters (year and month as submitted)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CotisationFilters {
    pub membre_id: Option<i64>,
    pub localite_id: Option<i64>,
    pub annee: Option<String>,
    pub mois: Option<String>,
}

/// Outcome of a bulk dues submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertSummary {
    pub created: usize,
    pub updated: usize,
}

impl UpsertSummary {
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

/// Which members a bulk entry sheet lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFilter {
    /// Members with a record for the period
    #[serde(rename = "payes")]
    Paid,
    /// Members without a record for the period
    #[default]
    #[serde(rename = "non_payes")]
    Unpaid,
    #[serde(rename = "tous")]
    All,
}

/// One member line of the bulk entry sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EntrySheetRow {
    pub membre_id: i64,
    pub prenom: String,
    pub nom: String,
    pub telephone: Option<String>,
    /// Amount already recorded for the period
    pub montant_existant: Option<f64>,
}

/// Bulk entry sheet for a (year, month)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySheet {
    pub annee: i32,
    pub mois: i32,
    pub filtre: PaymentFilter,
    pub localite_id: Option<i64>,
    pub rows: Vec<EntrySheetRow>,
}

/// Member standing derived from the latest dues record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStanding {
    pub membre_id: i64,
    pub up_to_date: bool,
    pub last_payment: Option<NaiveDate>,
    pub last_status: Option<String>,
}
