//! Section subtitles of printed reports

use super::builder::ReportKind;
use super::period::{Period, ReportFilters};
use shared::i18n::Locale;

/// Subtitle of one period section, keyed on which filters are set
///
/// | Filters | Subtitle |
/// |---------|----------|
/// | locality only | `Mars 2026 - Abidjan` |
/// | year + month + locality | `2024 - Abidjan` |
/// | year + month | `Mars 2024` |
/// | year (+ locality) | `Mars 2024[ - Abidjan]` |
/// | otherwise | `Mars 2026` |
pub fn compute_subtitle(period: Period, filters: &ReportFilters, locale: Locale) -> String {
    let month_year = period.label(locale);
    let locality = filters.locality.as_ref().map(|l| l.label.as_str());

    match (filters.year, filters.month, locality) {
        (None, None, Some(loc)) => format!("{month_year} - {loc}"),
        (Some(year), Some(_), Some(loc)) => format!("{year} - {loc}"),
        (Some(_), None, Some(loc)) => format!("{month_year} - {loc}"),
        _ => month_year,
    }
}

/// Subtitle of the placeholder section emitted when nothing matched
///
/// Dues reports restricted to a locality without a month show the locality
/// label alone; expense reports reuse [`compute_subtitle`].
pub fn placeholder_subtitle(
    kind: ReportKind,
    period: Period,
    filters: &ReportFilters,
    locale: Locale,
) -> String {
    match kind {
        ReportKind::Dues => match (&filters.locality, filters.month) {
            (Some(locality), None) => locality.label.clone(),
            _ => period.label(locale),
        },
        ReportKind::Expenses => compute_subtitle(period, filters, locale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::period::LocalityFilter;

    fn filters(year: Option<i32>, month: Option<u32>, loc: bool) -> ReportFilters {
        ReportFilters {
            membre_id: None,
            locality: loc.then(|| LocalityFilter {
                id: 7,
                label: "Yamoussoukro".into(),
            }),
            year,
            month,
        }
    }

    #[test]
    fn test_subtitle_table() {
        let p = Period::new(2024, 3);
        let fr = Locale::Fr;
        assert_eq!(compute_subtitle(p, &filters(None, None, true), fr), "Mars 2024 - Yamoussoukro");
        assert_eq!(compute_subtitle(p, &filters(Some(2024), Some(3), true), fr), "2024 - Yamoussoukro");
        assert_eq!(compute_subtitle(p, &filters(Some(2024), Some(3), false), fr), "Mars 2024");
        assert_eq!(compute_subtitle(p, &filters(Some(2024), None, true), fr), "Mars 2024 - Yamoussoukro");
        assert_eq!(compute_subtitle(p, &filters(Some(2024), None, false), fr), "Mars 2024");
        assert_eq!(compute_subtitle(p, &filters(None, None, false), fr), "Mars 2024");
        assert_eq!(compute_subtitle(p, &filters(None, Some(3), true), fr), "Mars 2024");
    }

    #[test]
    fn test_placeholder_rules_differ_by_kind() {
        let p = Period::new(2024, 3);
        let f = filters(Some(2024), None, true);
        assert_eq!(placeholder_subtitle(ReportKind::Dues, p, &f, Locale::Fr), "Yamoussoukro");
        assert_eq!(
            placeholder_subtitle(ReportKind::Expenses, p, &f, Locale::Fr),
            "Mars 2024 - Yamoussoukro"
        );

        let with_month = filters(Some(2024), Some(3), true);
        assert_eq!(placeholder_subtitle(ReportKind::Dues, p, &with_month, Locale::Fr), "Mars 2024");
    }

    #[test]
    fn test_english_month_names() {
        let p = Period::new(2025, 12);
        assert_eq!(compute_subtitle(p, &filters(None, None, false), Locale::En), "December 2025");
    }
}
