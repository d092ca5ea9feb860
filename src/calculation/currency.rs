//! Cent rounding and rate formatting shared by the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to the cent, half away from zero.
///
/// Every withheld or garnished amount passes through here when it is produced,
/// so totals built from them are exact sums.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncates a statutory ceiling to the cent.
///
/// A ceiling rounded up could exceed its statutory fraction by up to half a cent.
pub fn floor_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Formats a fractional rate as a percentage string ("0.022" → "2.2%").
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// Formats `part / whole` as a percentage with two decimals ("14.07%").
///
/// A zero `whole` formats as "0.00%".
pub fn format_ratio(part: Decimal, whole: Decimal) -> String {
    if whole.is_zero() {
        return "0.00%".to_string();
    }
    let pct = (part / whole * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", pct)
}
