use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Message shown next to a field whose text is not a number.
pub const INVALID_NUMBER: &str = "Please enter a valid positive number";

/// A form field held text that could not be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{INVALID_NUMBER}: '{input}'")]
pub struct ParseNumberError {
    pub input: String,
}

/// Trims whitespace and drops thousands separators.
fn normalize_number_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses form text into a non-negative [`Decimal`].
///
/// `"1,234.56"` is accepted. Empty input reads as 0 so that blank fields
/// reach the calculator's own range checks.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseNumberError> {
    let normalized = normalize_number_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    match normalized.parse::<Decimal>() {
        Ok(value) if !value.is_sign_negative() => Ok(value),
        Ok(_) | Err(_) => {
            tracing::warn!(input = %s, "rejected numeric input");
            Err(ParseNumberError {
                input: s.to_string(),
            })
        }
    }
}

/// Parses form text into a whole count. Empty input reads as 0.
pub fn parse_count(s: &str) -> Result<u32, ParseNumberError> {
    let normalized = normalize_number_input(s);
    if normalized.is_empty() {
        return Ok(0);
    }
    normalized.parse::<u32>().map_err(|e| {
        tracing::warn!(input = %s, "rejected count input: {}", e);
        ParseNumberError {
            input: s.to_string(),
        }
    })
}

/// Formats an amount as US dollars: `$1,234.56`, `-$12.50`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Formats a percentage with one decimal place: `12.5%`.
pub fn format_percentage(percent: Decimal) -> String {
    let rounded = percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.1}%")
}

/// Formats a plain quantity with thousands separators, keeping any fraction.
pub fn format_quantity(value: Decimal) -> String {
    let text = value.normalize().to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    match digits.split_once('.') {
        Some((whole, fraction)) => format!("{sign}{}.{fraction}", group_thousands(whole)),
        None => format!("{sign}{}", group_thousands(digits)),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56"), Ok(dec!(1234.56)));
        assert_eq!(parse_decimal("  2.5 "), Ok(dec!(2.5)));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal(""), Ok(Decimal::ZERO));
        assert_eq!(parse_decimal("   "), Ok(Decimal::ZERO));
    }

    #[test]
    fn parse_decimal_rejects_text_and_negatives() {
        assert!(parse_decimal("abc").is_err());
        assert_eq!(
            parse_decimal("-5"),
            Err(ParseNumberError {
                input: "-5".to_string()
            })
        );
    }

    #[test]
    fn parse_count_wants_whole_numbers() {
        assert_eq!(parse_count("1,500"), Ok(1500));
        assert_eq!(parse_count(""), Ok(0));
        assert!(parse_count("2.5").is_err());
        assert!(parse_count("-1").is_err());
    }

    #[test]
    fn currency_groups_and_rounds_half_up() {
        assert_eq!(format_currency(dec!(1234.565)), "$1,234.57");
        assert_eq!(format_currency(dec!(1234567)), "$1,234,567.00");
        assert_eq!(format_currency(dec!(0.5)), "$0.50");
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn currency_puts_sign_before_dollar() {
        assert_eq!(format_currency(dec!(-25.5)), "-$25.50");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn percentage_has_one_decimal() {
        assert_eq!(format_percentage(dec!(12.5)), "12.5%");
        assert_eq!(format_percentage(dec!(43.125)), "43.1%");
        assert_eq!(format_percentage(dec!(50)), "50.0%");
    }

    #[test]
    fn quantity_keeps_fraction() {
        assert_eq!(format_quantity(dec!(1500)), "1,500");
        assert_eq!(format_quantity(dec!(150.50)), "150.5");
    }
}
