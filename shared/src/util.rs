use rust_decimal::prelude::*;

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

// ── Money ───────────────────────────────────────────────────────────
//
// Amounts are stored as f64 (SQLite REAL) and summed as Decimal.

const DECIMAL_PLACES: u32 = 2;

/// Largest amount a single record may carry
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Convert a stored amount to Decimal; `None` when non-finite or out of range
#[inline]
pub fn to_decimal(value: f64) -> Option<Decimal> {
    let converted = Decimal::from_f64(value);
    if converted.is_none() {
        tracing::error!(value = ?value, "Amount does not fit a Decimal");
    }
    converted
}

/// Add a stored amount to a running total; `None` on overflow
#[inline]
pub fn add_money(total: Decimal, value: f64) -> Option<Decimal> {
    total.checked_add(to_decimal(value)?)
}

/// Round a Decimal to 2 places (half away from zero)
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_else(|| {
        tracing::error!(value = %value, "Decimal out of f64 range, defaulting to zero");
        0.0
    })
}

/// Sum stored amounts with decimal precision; `None` on overflow
pub fn sum_money<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = f64>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, add_money)
        .map(round_money)
}
