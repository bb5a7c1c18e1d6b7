//! Decimal amount text <-> integer minor units
//!
//! Amounts are stored as `i64` counts of the smallest currency unit (two
//! decimal places). Parsing scales the decimal text exactly; no floating point
//! is involved in either direction.

use thiserror::Error;

/// Number of decimal places carried by minor units
const DECIMAL_PLACES: usize = 2;
const SCALE: i64 = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount is malformed: {0}")]
    Malformed(String),

    #[error("Amount has more than two decimal places: {0}")]
    TooPrecise(String),

    #[error("Amount is out of range: {0}")]
    OutOfRange(String),
}

/// Parse decimal text such as `123.45`, `-0.5` or `+7` into minor units.
///
/// Extra fractional digits are accepted only when they are zeros, so
/// `1.230` parses but `1.234` is rejected.
pub fn parse_amount(text: &str) -> Result<i64, ParseAmountError> {
    if text.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (unsigned, ""),
    };

    if integer.is_empty() && fraction.is_empty() {
        return Err(ParseAmountError::Malformed(text.to_string()));
    }

    if !integer.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ParseAmountError::Malformed(text.to_string()));
    }

    let (kept, dropped) = fraction.split_at(fraction.len().min(DECIMAL_PLACES));

    if dropped.bytes().any(|b| b != b'0') {
        return Err(ParseAmountError::TooPrecise(text.to_string()));
    }

    let out_of_range = || ParseAmountError::OutOfRange(text.to_string());

    let mut value: i128 = 0;
    for digit in integer.bytes() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i128::from(digit - b'0')))
            .ok_or_else(out_of_range)?;
    }

    let mut cents: i128 = 0;
    for position in 0..DECIMAL_PLACES {
        cents *= 10;
        if let Some(digit) = kept.as_bytes().get(position) {
            cents += i128::from(digit - b'0');
        }
    }

    let magnitude = value
        .checked_mul(i128::from(SCALE))
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(out_of_range)?;
    let signed = if negative { -magnitude } else { magnitude };

    i64::try_from(signed).map_err(|_| out_of_range())
}

/// Render minor units as decimal text with exactly two decimal places.
pub fn format_amount(amount: i64) -> String {
    let magnitude = amount.unsigned_abs();
    let sign = if amount < 0 { "-" } else { "" };
    let scale = SCALE as u64;

    format!("{}{}.{:02}", sign, magnitude / scale, magnitude % scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("123.45").unwrap(), 12345);
        assert_eq!(parse_amount("0.12").unwrap(), 12);
        assert_eq!(parse_amount("0.05").unwrap(), 5);
        assert_eq!(parse_amount("-0.5").unwrap(), -50);
        assert_eq!(parse_amount("+7").unwrap(), 700);
        assert_eq!(parse_amount("1.230").unwrap(), 123);
        assert_eq!(parse_amount(".5").unwrap(), 50);
    }

    #[test]
    fn test_parse_amount_rejects_malformed() {
        assert_eq!(parse_amount(""), Err(ParseAmountError::Empty));
        assert!(matches!(
            parse_amount("1,234.56"),
            Err(ParseAmountError::Malformed(_))
        ));
        assert!(matches!(parse_amount("abc"), Err(ParseAmountError::Malformed(_))));
        assert!(matches!(parse_amount("-"), Err(ParseAmountError::Malformed(_))));
        assert!(matches!(parse_amount("1.2.3"), Err(ParseAmountError::Malformed(_))));
        assert!(matches!(
            parse_amount("1.234"),
            Err(ParseAmountError::TooPrecise(_))
        ));
        assert!(matches!(
            parse_amount("99999999999999999999"),
            Err(ParseAmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(12345), "123.45");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(-12), "-0.12");
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(-100), "-1.00");
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        let samples = [
            0,
            1,
            -1,
            99,
            -99,
            100,
            12345,
            -12345,
            i64::MAX,
            i64::MIN + 1,
            i64::MIN,
        ];

        for amount in samples {
            assert_eq!(parse_amount(&format_amount(amount)).unwrap(), amount);
        }
    }
}
