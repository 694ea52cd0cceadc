//! Reporting periods and filters

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::i18n::Locale;
use std::fmt;

/// Locality a report is restricted to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityFilter {
    pub id: i64,
    pub label: String,
}

/// Filters of a printed report, already validated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilters {
    pub membre_id: Option<i64>,
    pub locality: Option<LocalityFilter>,
    pub year: Option<i32>,
    /// 1..=12
    pub month: Option<u32>,
}

/// A calendar (year, month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The month before, crossing into December of the previous year
    pub fn previous(self) -> Self {
        if self.month <= 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// "Mars 2024"
    pub fn label(&self, locale: Locale) -> String {
        format!("{} {}", locale.month_name(self.month), self.year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Period used when a filter leaves year or month open: the filter value,
/// else today's
pub fn fallback_period(filters: &ReportFilters, today: NaiveDate) -> Period {
    Period::new(
        filters.year.unwrap_or(today.year()),
        filters.month.unwrap_or(today.month()),
    )
}

/// Candidate periods of a report, in order
///
/// - year without month: the twelve months of that year
/// - neither year nor month (locality alone or nothing): January up to the
///   current month of the current year
/// - anything else: the single fallback period
///
/// Empty periods are dropped later by the builder.
pub fn select_reporting_periods(filters: &ReportFilters, today: NaiveDate) -> Vec<Period> {
    match (filters.year, filters.month) {
        (Some(year), None) => (1..=12).map(|m| Period::new(year, m)).collect(),
        (None, None) => (1..=today.month())
            .map(|m| Period::new(today.year(), m))
            .collect(),
        _ => vec![fallback_period(filters, today)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn locality() -> Option<LocalityFilter> {
        Some(LocalityFilter {
            id: 1,
            label: "Abidjan".into(),
        })
    }

    #[test]
    fn test_year_only_gives_twelve_months() {
        let filters = ReportFilters {
            year: Some(2024),
            ..Default::default()
        };
        let periods = select_reporting_periods(&filters, date(2026, 4, 10));
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0], Period::new(2024, 1));
        assert_eq!(periods[11], Period::new(2024, 12));
    }

    #[test]
    fn test_no_filter_gives_elapsed_months() {
        let today = date(2026, 4, 10);
        let expected: Vec<Period> = (1..=4).map(|m| Period::new(2026, m)).collect();

        assert_eq!(select_reporting_periods(&ReportFilters::default(), today), expected);

        let by_locality = ReportFilters {
            locality: locality(),
            ..Default::default()
        };
        assert_eq!(select_reporting_periods(&by_locality, today), expected);
    }

    #[test]
    fn test_month_selects_single_period() {
        let today = date(2026, 4, 10);
        let both = ReportFilters {
            year: Some(2024),
            month: Some(3),
            ..Default::default()
        };
        assert_eq!(select_reporting_periods(&both, today), vec![Period::new(2024, 3)]);

        let month_only = ReportFilters {
            month: Some(11),
            ..Default::default()
        };
        assert_eq!(
            select_reporting_periods(&month_only, today),
            vec![Period::new(2026, 11)]
        );
    }

    #[test]
    fn test_previous_crosses_year() {
        assert_eq!(Period::new(2026, 1).previous(), Period::new(2025, 12));
        assert_eq!(Period::new(2026, 5).previous(), Period::new(2026, 4));
    }

    #[test]
    fn test_display_and_label() {
        let p = Period::new(2024, 2);
        assert_eq!(p.to_string(), "2024-02");
        assert_eq!(p.label(Locale::Fr), "Février 2024");
    }
}
