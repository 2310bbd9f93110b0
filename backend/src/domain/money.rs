//! Numeric policy for the station: currency rounding, input parsing and
//! display formatting.
//!
//! Values are stored as `f64` on the entities. Every calculation goes through
//! `Decimal` so that sums and products round the same way the cash register
//! does (two places, half away from zero). Decimal arithmetic is checked; a
//! value Decimal cannot hold falls back to plain `f64` arithmetic instead of
//! panicking or collapsing to zero. Form input above `MAX_INPUT` is rejected
//! on entry, so stored figures always stay inside Decimal's range.

use rust_decimal::prelude::*;

use crate::domain::errors::{StationError, StationResult};

const CURRENCY_PLACES: u32 = 2;
const PERCENT_PLACES: u32 = 1;

/// Largest magnitude accepted for any meter, volume, price or amount
pub const MAX_INPUT: f64 = 1_000_000_000_000.0;

/// Convert f64 to Decimal; None for NaN, infinities and values outside Decimal's range
#[inline]
pub fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

/// Round a Decimal to `places` (half away from zero) and convert back to f64
#[inline]
pub fn round_dp(value: Decimal, places: u32) -> f64 {
    value
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a Decimal to cents
#[inline]
pub fn to_currency(value: Decimal) -> f64 {
    round_dp(value, CURRENCY_PLACES)
}

/// Round to cents; values Decimal cannot represent are returned unchanged
pub fn round_currency(value: f64) -> f64 {
    to_decimal(value).map(to_currency).unwrap_or(value)
}

pub fn round_percent(value: f64) -> f64 {
    to_decimal(value)
        .map(|d| round_dp(d, PERCENT_PLACES))
        .unwrap_or(value)
}

/// `quantity * unit_price` rounded to cents
pub fn line_total(quantity: f64, unit_price: f64) -> f64 {
    match (to_decimal(quantity), to_decimal(unit_price)) {
        (Some(q), Some(p)) => q.checked_mul(p).map(to_currency).unwrap_or(quantity * unit_price),
        _ => quantity * unit_price,
    }
}

/// Exact difference `to - from` without binary float drift
pub fn difference(from: f64, to: f64) -> f64 {
    match (to_decimal(from), to_decimal(to)) {
        (Some(f), Some(t)) => t.checked_sub(f).and_then(|d| d.to_f64()).unwrap_or(to - from),
        _ => to - from,
    }
}

/// Exact sum `a + b`
pub fn add(a: f64, b: f64) -> f64 {
    match (to_decimal(a), to_decimal(b)) {
        (Some(x), Some(y)) => x.checked_add(y).and_then(|d| d.to_f64()).unwrap_or(a + b),
        _ => a + b,
    }
}

/// Sum of currency amounts rounded to cents; order of the input does not matter
pub fn sum_currency<I>(amounts: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let amounts: Vec<f64> = amounts.into_iter().collect();
    amounts
        .iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(to_decimal(*amount)?))
        .map(to_currency)
        .unwrap_or_else(|| amounts.iter().sum())
}

/// `part / whole * 100`, or None when `whole` is zero
pub fn percentage(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 {
        return None;
    }
    let exact = match (to_decimal(part), to_decimal(whole)) {
        (Some(p), Some(w)) if !w.is_zero() => p
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(w))
            .and_then(|d| d.to_f64()),
        _ => None,
    };
    Some(exact.unwrap_or(part / whole * 100.0))
}

/// Reject values that are not finite or exceed `MAX_INPUT`
pub fn check_range(field: &str, value: f64) -> StationResult<f64> {
    if !value.is_finite() {
        return Err(StationError::validation(format!("{} must be a finite number", field)));
    }
    if value.abs() > MAX_INPUT {
        return Err(StationError::validation(format!("{} is too large", field)));
    }
    Ok(value)
}

/// Strip currency symbols, thousands separators and spaces from form input
pub fn clean_numeric_input(input: &str, currency_symbol: &str) -> String {
    let mut cleaned = input.trim().to_string();
    if !currency_symbol.is_empty() {
        cleaned = cleaned.replace(currency_symbol, "");
    }
    cleaned.replace([',', ' '], "")
}

/// Parse a required numeric form field.
///
/// Empty input, text that is not a number, NaN/infinite values and values
/// beyond `MAX_INPUT` are all rejected with `ValidationFailed` naming the field.
pub fn parse_amount(field: &str, input: &str, currency_symbol: &str) -> StationResult<f64> {
    let cleaned = clean_numeric_input(input, currency_symbol);
    if cleaned.is_empty() {
        return Err(StationError::validation(format!("{} is required", field)));
    }
    let value = cleaned
        .parse::<f64>()
        .map_err(|_| StationError::validation(format!("{} must be a number, got '{}'", field, input.trim())))?;
    check_range(field, value)
}

/// Parse a required field that must be strictly positive
pub fn parse_positive_amount(field: &str, input: &str, currency_symbol: &str) -> StationResult<f64> {
    let value = parse_amount(field, input, currency_symbol)?;
    require_positive(field, Some(value))
}

/// Lenient parse used while the user is still typing: anything that is not a
/// finite number within `MAX_INPUT` is treated as "not entered yet"
pub fn parse_preview(input: &str) -> Option<f64> {
    let cleaned = clean_numeric_input(input, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= MAX_INPUT)
}

pub fn require_positive(field: &str, value: Option<f64>) -> StationResult<f64> {
    let value = value.ok_or_else(|| StationError::validation(format!("{} is required", field)))?;
    let value = check_range(field, value)?;
    if value <= 0.0 {
        return Err(StationError::validation(format!("{} must be greater than 0", field)));
    }
    Ok(value)
}

/// Format amount for display
pub fn format_currency(currency_symbol: &str, amount: f64) -> String {
    let rounded = round_currency(amount);
    if rounded < 0.0 {
        format!("-{}{:.2}", currency_symbol, rounded.abs())
    } else {
        format!("{}{:.2}", currency_symbol, rounded)
    }
}

/// Format a change with an explicit sign, e.g. "+$0.03"
pub fn format_signed_currency(currency_symbol: &str, amount: f64) -> String {
    let rounded = round_currency(amount);
    if rounded > 0.0 {
        format!("+{}", format_currency(currency_symbol, rounded))
    } else {
        format_currency(currency_symbol, rounded)
    }
}

/// Format a volume with thousands separators, e.g. "32,500 L"
pub fn format_volume(litres: f64) -> String {
    let rounded = litres.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{} L", grouped)
    } else {
        format!("{} L", grouped)
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", round_percent(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;

    #[test]
    fn test_line_total_rounds_half_up() {
        assert_eq!(line_total(3230.0, 1.45), 4683.5);
        assert_eq!(line_total(1.0, 0.125), 0.13);
        assert_eq!(line_total(0.0, 1.45), 0.0);
    }

    #[test]
    fn test_difference_is_exact() {
        assert_eq!(difference(1.42, 1.45), 0.03);
        assert_eq!(difference(15420.0, 18650.0), 3230.0);
        assert_eq!(difference(18650.0, 15420.0), -3230.0);
    }

    #[test]
    fn test_sum_currency_is_order_independent() {
        let forward = sum_currency(vec![0.1, 0.2, 450.0, 120.35]);
        let backward = sum_currency(vec![120.35, 450.0, 0.2, 0.1]);
        assert_eq!(forward, 570.65);
        assert_eq!(forward, backward);
        assert_eq!(sum_currency(Vec::new()), 0.0);
    }

    #[test]
    fn test_percentage_guards_zero() {
        assert_eq!(percentage(32500.0, 50000.0), Some(65.0));
        assert_eq!(percentage(1.0, 0.0), None);
        assert_eq!(round_percent(percentage(0.03, 1.42).unwrap()), 2.1);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("Amount", "10.50", "$").unwrap(), 10.5);
        assert_eq!(parse_amount("Amount", " $1,234.56 ", "$").unwrap(), 1234.56);
        assert_eq!(parse_amount("Amount", "-5", "$").unwrap(), -5.0);

        let error = parse_amount("Amount", "", "$").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailed);
        assert_eq!(error.user_message(), "Amount is required");

        assert!(parse_amount("Amount", "abc", "$").is_err());
        assert!(parse_amount("Amount", "inf", "$").is_err());
        assert!(parse_amount("Amount", "NaN", "$").is_err());
    }

    #[test]
    fn test_parse_positive_amount() {
        assert_eq!(parse_positive_amount("New price", "1.49", "$").unwrap(), 1.49);
        assert!(parse_positive_amount("New price", "0", "$").is_err());
        assert!(parse_positive_amount("New price", "-1", "$").is_err());
    }

    #[test]
    fn test_parse_preview() {
        assert_eq!(parse_preview("15420"), Some(15420.0));
        assert_eq!(parse_preview("15,420"), Some(15420.0));
        assert_eq!(parse_preview(""), None);
        assert_eq!(parse_preview("12a"), None);
        assert_eq!(parse_preview("NaN"), None);
    }

    #[test]
    fn test_arithmetic_beyond_decimal_range_does_not_panic() {
        assert_eq!(line_total(1e20, 1e10), 1e30);
        assert_eq!(add(5e28, 5e28), 1e29);
        assert_eq!(difference(0.0, 1e30), 1e30);
        assert_eq!(sum_currency(vec![7e28, 7e28]), 1.4e29);
        assert_eq!(percentage(1e30, 2e30), Some(50.0));
        assert_eq!(round_currency(1e30), 1e30);
    }

    #[test]
    fn test_to_decimal_rejects_unrepresentable() {
        assert!(to_decimal(1e30).is_none());
        assert!(to_decimal(f64::NAN).is_none());
        assert!(to_decimal(MAX_INPUT).is_some());
    }

    #[test]
    fn test_inputs_above_ceiling_rejected() {
        let error = parse_amount("Closing meter", "1e30", "$").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailed);
        assert_eq!(error.user_message(), "Closing meter is too large");
        assert!(parse_amount("Amount", "1000000000000", "$").is_ok());
        assert!(require_positive("Amount", Some(MAX_INPUT * 10.0)).is_err());
        assert_eq!(parse_preview("100000000000000000000"), None);
        assert!(check_range("Refill volume", -MAX_INPUT).is_ok());
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency("$", 4683.5), "$4683.50");
        assert_eq!(format_currency("$", -0.03), "-$0.03");
        assert_eq!(format_signed_currency("$", 0.03), "+$0.03");
        assert_eq!(format_signed_currency("$", -0.04), "-$0.04");
        assert_eq!(format_signed_currency("$", 0.0), "$0.00");
    }

    #[test]
    fn test_format_volume_and_percent() {
        assert_eq!(format_volume(32500.0), "32,500 L");
        assert_eq!(format_volume(950.0), "950 L");
        assert_eq!(format_volume(1234567.4), "1,234,567 L");
        assert_eq!(format_volume(-2500.0), "-2,500 L");
        assert_eq!(format_percent(65.0), "65.0%");
        assert_eq!(format_percent(2.1126), "2.1%");
    }
}
