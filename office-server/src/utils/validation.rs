//! Input validation helpers
//!
//! Centralized text length constants and field validators. Validators record
//! localized messages into a [`FieldErrors`] collection instead of failing
//! fast, so a submission reports every problem at once and nothing is written
//! until the collection is empty.

use shared::error::FieldErrors;
use shared::i18n::Locale;
use shared::util::MAX_AMOUNT;

// ── Text length limits ──────────────────────────────────────────────

/// Names: role, locality, member, description, provider, reference
pub const MAX_NAME_LEN: usize = 255;

/// Member first and last names
pub const MAX_PERSON_NAME_LEN: usize = 100;

/// Role descriptions, addresses
pub const MAX_NOTE_LEN: usize = 500;

/// Phone numbers
pub const MAX_PHONE_LEN: usize = 20;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// URLs / blob paths
pub const MAX_URL_LEN: usize = 2048;

// ── Text ────────────────────────────────────────────────────────────

/// Trim and map blank strings to `None`
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Required string: non-blank and within the length limit (in characters).
pub fn validate_required_text(
    errors: &mut FieldErrors,
    locale: Locale,
    field: &str,
    value: &str,
    max_len: usize,
) {
    if value.trim().is_empty() {
        errors.add(field, locale.required(field));
    } else if value.chars().count() > max_len {
        errors.add(field, locale.too_long(field, max_len));
    }
}

/// Optional string: if present, within the length limit.
pub fn validate_optional_text(
    errors: &mut FieldErrors,
    locale: Locale,
    field: &str,
    value: &Option<String>,
    max_len: usize,
) {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        errors.add(field, locale.too_long(field, max_len));
    }
}

// ── Amounts ─────────────────────────────────────────────────────────

/// Monetary amount: finite and within `0..=MAX_AMOUNT`
pub fn validate_amount(errors: &mut FieldErrors, locale: Locale, field: &str, value: f64) {
    if !value.is_finite() {
        errors.add(field, locale.not_a_number(field));
    } else if value < 0.0 {
        errors.add(field, locale.min_zero(field));
    } else if value > MAX_AMOUNT {
        errors.add(field, locale.max_amount(field, MAX_AMOUNT));
    }
}

pub fn validate_optional_amount(
    errors: &mut FieldErrors,
    locale: Locale,
    field: &str,
    value: Option<f64>,
) {
    if let Some(v) = value {
        validate_amount(errors, locale, field, v);
    }
}

// ── Periods ─────────────────────────────────────────────────────────

/// Parse a 4-digit year string ("2024")
pub fn parse_year(value: &str) -> Option<i32> {
    let v = value.trim();
    if v.len() == 4 && v.bytes().all(|b| b.is_ascii_digit()) {
        v.parse().ok()
    } else {
        None
    }
}

/// Parse a month string, with or without leading zero ("3", "03")
pub fn parse_month(value: &str) -> Option<u32> {
    let v = value.trim();
    if v.is_empty() || v.len() > 2 || !v.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    v.parse().ok().filter(|m| (1..=12).contains(m))
}

/// Required year field; records a message and returns `None` when invalid
pub fn validate_year(
    errors: &mut FieldErrors,
    locale: Locale,
    field: &str,
    value: &str,
) -> Option<i32> {
    if value.trim().is_empty() {
        errors.add(field, locale.required(field));
        return None;
    }
    let year = parse_year(value);
    if year.is_none() {
        errors.add(field, locale.invalid_year(field));
    }
    year
}

/// Required month field; records a message and returns `None` when invalid
pub fn validate_month(
    errors: &mut FieldErrors,
    locale: Locale,
    field: &str,
    value: &str,
) -> Option<u32> {
    if value.trim().is_empty() {
        errors.add(field, locale.required(field));
        return None;
    }
    let month = parse_month(value);
    if month.is_none() {
        errors.add(field, locale.invalid_month(field));
    }
    month
}

/// Optional year/month filter pair as submitted by a listing form
pub fn parse_period_filter(
    locale: Locale,
    annee: Option<&str>,
    mois: Option<&str>,
) -> Result<(Option<i32>, Option<u32>), FieldErrors> {
    let mut errors = FieldErrors::new();
    let year = annee
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| validate_year(&mut errors, locale, "annee", v));
    let month = mois
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| validate_month(&mut errors, locale, "mois", v));
    if errors.is_empty() {
        Ok((year, month))
    } else {
        Err(errors)
    }
}
