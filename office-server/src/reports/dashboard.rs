//! Dashboard statistics

use super::period::Period;
use super::standing::count_up_to_date;
use crate::auth::{Permission, require_permission};
use crate::core::ServerState;
use crate::db::repository::{cotisation, depense, membre};
use crate::services::RequestContext;
use crate::utils::{AppResult, amount_overflow};
use crate::utils::validation::parse_period_filter;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::AppError;
use shared::i18n::Locale;
use shared::models::{CotisationDetail, DepenseDetail};
use shared::util::{round_money, to_decimal};

/// Number of latest dues and expenses shown
const LATEST_LIMIT: i64 = 4;

/// Months in the trend chart
const TREND_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_members: i64,
    pub active_members: i64,
    pub total_dues: Decimal,
    pub total_expenses: Decimal,
    /// Dues minus expenses
    pub balance: Decimal,
    pub month_dues: Decimal,
    pub month_expenses: Decimal,
    pub up_to_date_members: i64,
    pub late_members: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: Period,
    /// "Mai 2026"
    pub label: String,
    pub dues: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub year: Option<i32>,
    pub stats: DashboardStats,
    pub latest_dues: Vec<CotisationDetail>,
    pub latest_expenses: Vec<DepenseDetail>,
    pub trend: Vec<TrendPoint>,
}

/// Periods of the six-month trend
///
/// With a year: `max(1, m - 5)..=m` of that year, `m` being the current
/// month for the current year and December otherwise. Without: the six
/// calendar months ending with the current one.
pub fn trend_periods(year: Option<i32>, today: NaiveDate) -> Vec<Period> {
    match year {
        Some(year) => {
            let last = if year == today.year() { today.month() } else { 12 };
            let first = last.saturating_sub(TREND_MONTHS - 1).max(1);
            (first..=last).map(|m| Period::new(year, m)).collect()
        }
        None => {
            let mut periods = Vec::with_capacity(TREND_MONTHS as usize);
            let mut period = Period::of_date(today);
            for _ in 0..TREND_MONTHS {
                periods.push(period);
                period = period.previous();
            }
            periods.reverse();
            periods
        }
    }
}

/// Stored sum as a rounded Decimal
fn money(value: f64) -> AppResult<Decimal> {
    to_decimal(value).map(round_money).ok_or_else(amount_overflow)
}

async fn trend_point(state: &ServerState, period: Period, locale: Locale) -> AppResult<TrendPoint> {
    let month = Some(period.month as i32);
    let dues = cotisation::sum_amount(&state.pool, Some(period.year), month).await?;
    let expenses = depense::sum_effective(&state.pool, Some(period.year), month).await?;
    Ok(TrendPoint {
        period,
        label: period.label(locale),
        dues: money(dues)?,
        expenses: money(expenses)?,
    })
}

/// Dashboard for an optional year filter (as submitted)
pub async fn build_dashboard(
    state: &ServerState,
    ctx: &RequestContext,
    annee: Option<&str>,
    today: NaiveDate,
) -> AppResult<Dashboard> {
    require_permission(&ctx.actor, Permission::DashboardView)?;
    let (year, _) = parse_period_filter(ctx.locale, annee, None)
        .map_err(|errors| AppError::invalid_fields(&errors))?;

    let pool = &state.pool;
    let (total_members, active_members) = membre::counts(pool).await?;

    let total_dues = money(cotisation::sum_amount(pool, year, None).await?)?;
    let total_expenses = money(depense::sum_effective(pool, year, None).await?)?;

    let month_year = year.unwrap_or(today.year());
    let current_month = Some(today.month() as i32);
    let month_dues = money(cotisation::sum_amount(pool, Some(month_year), current_month).await?)?;
    let month_expenses =
        money(depense::sum_effective(pool, Some(month_year), current_month).await?)?;

    let up_to_date_members =
        count_up_to_date(pool, today, state.config.up_to_date_window_days).await?;

    let mut trend = Vec::new();
    for period in trend_periods(year, today) {
        trend.push(trend_point(state, period, ctx.locale).await?);
    }

    let stats = DashboardStats {
        total_members,
        active_members,
        total_dues,
        total_expenses,
        balance: total_dues - total_expenses,
        month_dues,
        month_expenses,
        up_to_date_members,
        late_members: total_members - up_to_date_members,
    };
    tracing::debug!(year = ?year, members = total_members, "Dashboard computed");

    Ok(Dashboard {
        year,
        stats,
        latest_dues: cotisation::latest(pool, year, LATEST_LIMIT).await?,
        latest_expenses: depense::latest(pool, year, LATEST_LIMIT).await?,
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trend_current_year() {
        let periods = trend_periods(Some(2026), date(2026, 10, 19));
        let months: Vec<u32> = periods.iter().map(|p| p.month).collect();
        assert_eq!(months, [5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_trend_early_in_year_starts_at_january() {
        let periods = trend_periods(Some(2026), date(2026, 3, 1));
        let months: Vec<u32> = periods.iter().map(|p| p.month).collect();
        assert_eq!(months, [1, 2, 3]);
    }

    #[test]
    fn test_trend_past_year_ends_in_december() {
        let periods = trend_periods(Some(2024), date(2026, 3, 1));
        assert_eq!(periods.first(), Some(&Period::new(2024, 7)));
        assert_eq!(periods.last(), Some(&Period::new(2024, 12)));
    }

    #[test]
    fn test_trend_without_year_crosses_boundary() {
        let periods = trend_periods(None, date(2026, 2, 14));
        assert_eq!(
            periods,
            vec![
                Period::new(2025, 9),
                Period::new(2025, 10),
                Period::new(2025, 11),
                Period::new(2025, 12),
                Period::new(2026, 1),
                Period::new(2026, 2),
            ]
        );
    }
}
