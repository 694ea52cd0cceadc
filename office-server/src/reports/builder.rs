//! Printable period reports

use super::grouping::{LedgerEntry, LocalityGroup, aggregate_by_locality};
use super::period::{ReportFilters, fallback_period, select_reporting_periods};
use super::subtitle::{compute_subtitle, placeholder_subtitle};
use crate::utils::{AppResult, amount_overflow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::i18n::Locale;
use shared::util::round_money;

/// Which ledger a report prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Dues,
    Expenses,
}

impl ReportKind {
    pub fn title(&self, locale: Locale, association: &str) -> String {
        match self {
            ReportKind::Dues => locale.dues_report_title(association),
            ReportKind::Expenses => locale.expenses_report_title(association),
        }
    }
}

/// One (year, month) section
#[derive(Debug, Clone, Serialize)]
pub struct PeriodBucket<T> {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub subtitle: String,
    pub groups: Vec<LocalityGroup<T>>,
    pub total: Decimal,
    pub count: usize,
}

impl<T> PeriodBucket<T> {
    pub fn is_placeholder(&self) -> bool {
        self.count == 0
    }
}

/// A printable report: title plus at least one period section
#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport<T> {
    pub title: String,
    pub locality_selected: bool,
    pub buckets: Vec<PeriodBucket<T>>,
}

/// Build a report from records already restricted by member and locality
///
/// Records must be ordered most recent first; that order is kept inside
/// each locality group. Periods without records are skipped; when no period
/// has any, a single empty placeholder section is emitted. Fails when a
/// total leaves the Decimal range.
pub fn build_report<T>(
    kind: ReportKind,
    records: Vec<T>,
    filters: &ReportFilters,
    today: NaiveDate,
    locale: Locale,
    association: &str,
) -> AppResult<PeriodReport<T>>
where
    T: LedgerEntry,
{
    let periods = select_reporting_periods(filters, today);
    let mut per_period: Vec<Vec<T>> = periods.iter().map(|_| Vec::new()).collect();

    for record in records {
        let period = record.period();
        if let Some(index) = periods.iter().position(|p| *p == period) {
            per_period[index].push(record);
        }
    }

    let mut buckets = Vec::new();
    for (period, records) in periods.into_iter().zip(per_period) {
        if records.is_empty() {
            continue;
        }
        let count = records.len();
        let groups: Vec<LocalityGroup<T>> =
            aggregate_by_locality(records, locale)?.into_values().collect();
        let total = groups
            .iter()
            .try_fold(Decimal::ZERO, |acc, g| acc.checked_add(g.subtotal))
            .map(round_money)
            .ok_or_else(amount_overflow)?;

        buckets.push(PeriodBucket {
            year: period.year,
            month: period.month,
            month_name: locale.month_name(period.month),
            subtitle: compute_subtitle(period, filters, locale),
            groups,
            total,
            count,
        });
    }

    if buckets.is_empty() {
        let period = fallback_period(filters, today);
        buckets.push(PeriodBucket {
            year: period.year,
            month: period.month,
            month_name: locale.month_name(period.month),
            subtitle: placeholder_subtitle(kind, period, filters, locale),
            groups: Vec::new(),
            total: Decimal::ZERO,
            count: 0,
        });
    }

    tracing::debug!(
        kind = ?kind,
        buckets = buckets.len(),
        "Report built"
    );

    Ok(PeriodReport {
        title: kind.title(locale, association),
        locality_selected: filters.locality.is_some(),
        buckets,
    })
}
