//! Decimal formatting utilities for human-readable display.
//!
//! Currency amounts are rendered the way the game shows them (`$1,234.50`):
//! a `$` sign, thousands separators, and exactly two fraction digits, with
//! midpoints rounded away from zero. Quantities (holdings, units) are
//! rendered without trailing zeros.

use rust_decimal::prelude::*;

/// Fraction digits shown for currency amounts.
pub const CURRENCY_DECIMALS: u32 = 2;

/// Format a `Decimal` as US dollars: `$1,234.50`, `-$5.00`.
pub fn currency(value: &Decimal) -> String {
    let rounded = value.round_dp_with_strategy(
        CURRENCY_DECIMALS,
        RoundingStrategy::MidpointAwayFromZero,
    );
    let body = format!("{:.prec$}", rounded.abs(), prec = CURRENCY_DECIMALS as usize);
    let grouped = super::num::group_thousands(&body);

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Format a quantity for display: full precision, no trailing zeros.
pub fn display(value: &Decimal) -> String {
    super::num::display_formatted_string(value.normalize().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_currency_whole_amounts() {
        assert_eq!(currency(&dec("0")), "$0.00");
        assert_eq!(currency(&dec("200")), "$200.00");
        assert_eq!(currency(&dec("1000")), "$1,000.00");
        assert_eq!(currency(&dec("1234567")), "$1,234,567.00");
    }

    #[test]
    fn test_currency_rounds_to_cents() {
        assert_eq!(currency(&dec("1.505")), "$1.51");
        assert_eq!(currency(&dec("1.504")), "$1.50");
        assert_eq!(currency(&dec("0.005")), "$0.01");
        assert_eq!(currency(&dec("9999.999")), "$10,000.00");
    }

    #[test]
    fn test_currency_negative() {
        assert_eq!(currency(&dec("-5")), "-$5.00");
        assert_eq!(currency(&dec("-1234.5")), "-$1,234.50");
        assert_eq!(currency(&dec("-0.001")), "$0.00");
    }

    #[test]
    fn test_display_quantities() {
        assert_eq!(display(&dec("2")), "2");
        assert_eq!(display(&dec("2.500")), "2.5");
        assert_eq!(display(&dec("0.00012")), "0.00012");
        assert_eq!(display(&dec("-1500")), "-1,500");
    }
}
