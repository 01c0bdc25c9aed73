//! Currency normalization.
//!
//! Scraped amounts look like `£1,234.56` or `-£10.00`. They are converted to
//! signed pence with integer arithmetic on the digit string, so `£0.29` is
//! 29 and not the 28 a float multiply-and-truncate produces. Fractions with
//! more than two digits round half away from zero on the third digit.

use amex_protocols::ParseError;

const CURRENCY_SYMBOL: char = '£';
const THOUSANDS_SEPARATOR: char = ',';

/// Convert one scraped amount to pence.
pub fn normalize_amount(raw: &str) -> Result<i64, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyAmount);
    }

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };

    let unsigned = unsigned.strip_prefix(CURRENCY_SYMBOL).unwrap_or(unsigned);
    let digits: String = unsigned
        .chars()
        .filter(|c| *c != THOUSANDS_SEPARATOR)
        .collect();

    // `5.` and `.75` are both accepted; `.` alone has no digits.
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(ParseError::invalid_amount(raw, "not a decimal number"));
    }
    if whole.is_empty() && fraction.is_empty() {
        return Err(ParseError::invalid_amount(raw, "no digits"));
    }

    let pence =
        to_pence(whole, fraction).ok_or_else(|| ParseError::invalid_amount(raw, "out of range"))?;

    Ok(if negative { -pence } else { pence })
}

/// Convert an ordered batch, failing on the first malformed entry.
pub fn normalize_amounts<S: AsRef<str>>(raws: &[S]) -> Result<Vec<i64>, ParseError> {
    raws.iter().map(|raw| normalize_amount(raw.as_ref())).collect()
}

fn to_pence(whole: &str, fraction: &str) -> Option<i64> {
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

    let mut frac_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
    let tenths = frac_digits.next().unwrap_or(0);
    let hundredths = frac_digits.next().unwrap_or(0);
    let round_up = frac_digits.next().is_some_and(|d| d >= 5);

    whole
        .checked_mul(100)?
        .checked_add(tenths * 10 + hundredths + i64::from(round_up))
}
