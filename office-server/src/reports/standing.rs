//! Member standing ("up to date")

use crate::db::repository::RepoResult;
use crate::db::repository::cotisation::{self, LatestPayment};
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// Payment status labels (lowercased) that count as paid
pub const PAID_STATUS_LABELS: &[&str] = &[
    "payé", "payée", "paye", "validé", "validée", "valide", "acquitté", "acquittée",
];


pub fn is_paid_label(label: &str) -> bool {
    let normalized = label.trim().to_lowercase();
    PAID_STATUS_LABELS.contains(&normalized.as_str())
}

/// Whether a member's latest dues record makes them up to date on `today`
///
/// Fails closed: no record, no status, an unpaid status or no payment date
/// all mean late. The window is inclusive and measured in whole days either
/// side of `today`.
pub fn is_up_to_date(latest: Option<&LatestPayment>, today: NaiveDate, window_days: i64) -> bool {
    let Some(latest) = latest else {
        return false;
    };
    let paid = latest.statut_libelle.as_deref().is_some_and(is_paid_label);
    if !paid {
        return false;
    }
    match latest.date_paiement {
        Some(date) => (today - date).num_days().abs() <= window_days,
        None => false,
    }
}

/// Number of members currently up to date
pub async fn count_up_to_date(
    pool: &SqlitePool,
    today: NaiveDate,
    window_days: i64,
) -> RepoResult<i64> {
    let latest = cotisation::latest_payments(pool).await?;
    let count = latest
        .iter()
        .filter(|p| is_up_to_date(Some(p), today, window_days))
        .count();
    Ok(count as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(status: Option<&str>, date: Option<NaiveDate>) -> LatestPayment {
        LatestPayment {
            membre_id: 1,
            date_paiement: date,
            statut_libelle: status.map(str::to_string),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_window_is_inclusive() {
        let thirty = today() - chrono::Duration::days(30);
        let thirty_one = today() - chrono::Duration::days(31);
        assert!(is_up_to_date(Some(&payment(Some("Payé"), Some(thirty))), today(), 30));
        assert!(!is_up_to_date(Some(&payment(Some("Payé"), Some(thirty_one))), today(), 30));
    }

    #[test]
    fn test_unpaid_status_is_late() {
        let yesterday = today() - chrono::Duration::days(1);
        assert!(!is_up_to_date(Some(&payment(Some("En attente"), Some(yesterday))), today(), 30));
    }

    #[test]
    fn test_fails_closed() {
        assert!(!is_up_to_date(None, today(), 30));
        assert!(!is_up_to_date(Some(&payment(None, Some(today()))), today(), 30));
        assert!(!is_up_to_date(Some(&payment(Some("Payé"), None)), today(), 30));
    }

    #[test]
    fn test_paid_synonyms() {
        assert!(is_paid_label("PAYÉE"));
        assert!(is_paid_label(" Acquitté "));
        assert!(is_paid_label("valide"));
        assert!(!is_paid_label("Annulé"));
    }

    #[test]
    fn test_future_date_within_window() {
        let next_week = today() + chrono::Duration::days(7);
        assert!(is_up_to_date(Some(&payment(Some("Validé"), Some(next_week))), today(), 30));
    }
}
