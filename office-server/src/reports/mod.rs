//! Reporting engine
//!
//! Turns filtered dues and expense records into period sections grouped by
//! locality, plus the dashboard aggregates.
//!
//! - [`period`]: which (year, month) sections a report covers
//! - [`grouping`]: locality buckets with decimal subtotals
//! - [`subtitle`]: section subtitles
//! - [`builder`]: [`build_report`]
//! - [`roster`]: member roster print
//! - [`standing`]: member "up to date" rule
//! - [`dashboard`]: counts, totals and the six-month trend

pub mod builder;
pub mod dashboard;
pub mod grouping;
pub mod period;
pub mod roster;
pub mod standing;
pub mod subtitle;

pub use builder::{PeriodBucket, PeriodReport, ReportKind, build_report};
pub use dashboard::{Dashboard, DashboardStats, TrendPoint, build_dashboard, trend_periods};
pub use grouping::{LedgerEntry, LocalityGroup, aggregate_by_locality};
pub use period::{LocalityFilter, Period, ReportFilters, select_reporting_periods};
pub use roster::{MemberRoster, RosterGroup, build_roster};
pub use standing::{is_paid_label, is_up_to_date};
pub use subtitle::{compute_subtitle, placeholder_subtitle};

#[cfg(test)]
pub(crate) mod test_fixtures {
    use chrono::NaiveDate;
    use shared::models::{Cotisation, CotisationDetail, DepenseDetail, DepenseMedicale};

    pub fn dues(id: i64, annee: i32, mois: i32, montant: f64, localite: Option<&str>) -> CotisationDetail {
        CotisationDetail {
            cotisation: Cotisation {
                id,
                membre_id: id,
                montant,
                annee,
                mois,
                date_paiement: NaiveDate::from_ymd_opt(annee, mois as u32, 1),
                mode_paiement_id: None,
                statut_cotisation_id: None,
                reference: None,
                notes: None,
                enregistre_par: None,
                created_at: 0,
                updated_at: 0,
            },
            membre_nom: "Traoré".into(),
            membre_prenom: "Awa".into(),
            localite_id: localite.map(|_| 1),
            localite_libelle: localite.map(str::to_string),
            statut_libelle: None,
            mode_libelle: None,
        }
    }

    pub fn expense(
        id: i64,
        date: &str,
        montant: f64,
        transport: Option<f64>,
        total: Option<f64>,
        localite: Option<&str>,
    ) -> DepenseDetail {
        DepenseDetail {
            depense: DepenseMedicale {
                id,
                membre_id: id,
                categorie_depense_id: 1,
                description: "Consultation".into(),
                montant,
                date_depense: date.parse().unwrap(),
                nom_prestataire: None,
                personne_deleguee: None,
                transport_pers_deleguee: transport,
                montant_total: total,
                utilisateur_id: None,
                created_at: 0,
                updated_at: 0,
            },
            membre_nom: "Koffi".into(),
            membre_prenom: "Yao".into(),
            localite_id: localite.map(|_| 1),
            localite_libelle: localite.map(str::to_string),
            categorie_libelle: None,
        }
    }
}
