//! Locality grouping

use super::period::Period;
use crate::utils::{AppResult, amount_overflow};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::i18n::Locale;
use shared::models::{CotisationDetail, DepenseDetail};
use shared::util::{add_money, round_money};

/// A financial record that can be placed in a period and a locality
pub trait LedgerEntry {
    fn period(&self) -> Period;

    /// Locality label of the owning member, if any
    fn locality_label(&self) -> Option<&str>;

    /// Amount counted in subtotals
    fn effective_amount(&self) -> f64;
}

impl LedgerEntry for CotisationDetail {
    fn period(&self) -> Period {
        Period::new(self.cotisation.annee, self.cotisation.mois.max(0) as u32)
    }

    fn locality_label(&self) -> Option<&str> {
        self.localite_libelle.as_deref()
    }

    fn effective_amount(&self) -> f64 {
        self.cotisation.montant
    }
}

impl LedgerEntry for DepenseDetail {
    fn period(&self) -> Period {
        Period::of_date(self.depense.date_depense)
    }

    fn locality_label(&self) -> Option<&str> {
        self.localite_libelle.as_deref()
    }

    fn effective_amount(&self) -> f64 {
        self.depense.effective_amount()
    }
}

/// Records of one locality with their subtotal
#[derive(Debug, Clone, Serialize)]
pub struct LocalityGroup<T> {
    pub label: String,
    pub records: Vec<T>,
    pub subtotal: Decimal,
}

/// Group records by locality label, keeping the order in which each label
/// first appears; records without locality share the sentinel bucket.
/// Fails when a subtotal leaves the Decimal range.
pub fn aggregate_by_locality<T, I>(
    records: I,
    locale: Locale,
) -> AppResult<IndexMap<String, LocalityGroup<T>>>
where
    T: LedgerEntry,
    I: IntoIterator<Item = T>,
{
    let mut groups: IndexMap<String, LocalityGroup<T>> = IndexMap::new();

    for record in records {
        let label = record
            .locality_label()
            .unwrap_or_else(|| locale.no_locality())
            .to_string();
        let amount = record.effective_amount();
        let group = groups
            .entry(label.clone())
            .or_insert_with(|| LocalityGroup {
                label,
                records: Vec::new(),
                subtotal: Decimal::ZERO,
            });
        group.subtotal = add_money(group.subtotal, amount).ok_or_else(amount_overflow)?;
        group.records.push(record);
    }

    for group in groups.values_mut() {
        group.subtotal = round_money(group.subtotal);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_fixtures::{dues, expense};
    use crate::utils::ErrorCode;
    use rust_decimal::prelude::FromPrimitive;

    #[test]
    fn test_first_occurrence_order() {
        let records = vec![
            dues(1, 2024, 5, 1000.0, Some("Bouaké")),
            dues(2, 2024, 5, 2000.0, Some("Abidjan")),
            dues(3, 2024, 5, 500.0, None),
            dues(4, 2024, 5, 3000.0, Some("Bouaké")),
        ];
        let groups = aggregate_by_locality(records, Locale::Fr).unwrap();

        let labels: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(labels, ["Bouaké", "Abidjan", "Sans localité"]);
        assert_eq!(groups["Bouaké"].records.len(), 2);
        assert_eq!(groups["Bouaké"].subtotal, Decimal::from(4000));
        assert_eq!(groups["Sans localité"].subtotal, Decimal::from(500));
    }

    #[test]
    fn test_expense_total_never_double_counted() {
        let records = vec![
            expense(1, "2024-03-10", 1000.0, Some(500.0), Some(1500.0), Some("Abidjan")),
            expense(2, "2024-03-02", 800.0, None, None, Some("Abidjan")),
        ];
        let groups = aggregate_by_locality(records, Locale::Fr).unwrap();
        assert_eq!(groups["Abidjan"].subtotal, Decimal::from(2300));
    }

    #[test]
    fn test_decimal_subtotal() {
        let records = vec![
            dues(1, 2024, 1, 0.1, None),
            dues(2, 2024, 1, 0.2, None),
        ];
        let groups = aggregate_by_locality(records, Locale::En).unwrap();
        assert_eq!(groups["No locality"].subtotal, Decimal::from_f64(0.3).unwrap());
    }

    #[test]
    fn test_subtotal_overflow_is_an_error() {
        let records = vec![
            dues(1, 2024, 1, 5e28, Some("Abidjan")),
            dues(2, 2024, 1, 5e28, Some("Abidjan")),
        ];
        let err = aggregate_by_locality(records, Locale::Fr).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let err = aggregate_by_locality(vec![dues(1, 2024, 1, 1e30, None)], Locale::Fr).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }
}
