//! Date normalization: `01 JAN 20` becomes `01-01-20`.

use amex_protocols::ParseError;

/// Convert an abbreviated-month date to dash-delimited numeric form.
///
/// Accepts `DD MON` or `DD MON YY`, any run of whitespace between tokens,
/// month case-insensitive. Day and year are passed through untouched; the
/// site is trusted to emit plausible values.
pub fn normalize_date(raw: &str) -> Result<String, ParseError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();

    match tokens.len() {
        0 | 1 => {
            return Err(ParseError::invalid_date(raw, "expected day and month"));
        }
        2 | 3 => {}
        n => {
            return Err(ParseError::invalid_date(
                raw,
                format!("expected at most 3 tokens, got {}", n),
            ));
        }
    }

    let month = month_number(tokens[1]).ok_or_else(|| ParseError::UnknownMonth {
        raw: raw.to_string(),
        month: tokens[1].to_string(),
    })?;

    let mut parts = Vec::with_capacity(tokens.len());
    parts.push(tokens[0]);
    parts.push(month);
    parts.extend(tokens.get(2).copied());

    Ok(parts.join("-"))
}

fn month_number(abbrev: &str) -> Option<&'static str> {
    let month = match abbrev.to_ascii_uppercase().as_str() {
        "JAN" => "01",
        "FEB" => "02",
        "MAR" => "03",
        "APR" => "04",
        "MAY" => "05",
        "JUN" => "06",
        "JUL" => "07",
        "AUG" => "08",
        "SEP" => "09",
        "OCT" => "10",
        "NOV" => "11",
        "DEC" => "12",
        _ => return None,
    };
    Some(month)
}
