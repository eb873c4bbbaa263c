//! Permissive money parsing
//!
//! Source exports write amounts as `$1,234.00`, `12.5M`, `(500)` or leave the
//! cell blank. Every call site in the pipeline goes through [`parse_money`], so
//! there is exactly one policy:
//!
//! - `$`, `,`, inner whitespace and a trailing `M` are stripped
//! - a parenthesized amount is negative: `(500)` parses to `-500.0`
//! - anything unparseable, blank or non-finite is `0.0`
//!
//! The parser never fails and never drops the value's row.

/// Placeholder cells that mean "no amount"
const EMPTY_MARKERS: &[&str] = &["", "-", "—", "–", "nan", "none", "null", "n/a"];

/// Parse a loosely formatted money string into millions (or whatever unit the
/// column already carries). Returns `0.0` on any failure.
pub fn parse_money(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if EMPTY_MARKERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        return 0.0;
    }

    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let mut cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    if cleaned.ends_with('M') || cleaned.ends_with('m') {
        cleaned.pop();
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if negative {
                -value.abs()
            } else {
                value
            }
        }
        _ => 0.0,
    }
}

/// Parse a nullable integer year.
///
/// Accepts `2019` and float renderings such as `2019.0`; anything else,
/// including fractional values, is `None`.
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }

    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

/// Render an amount for CSV output.
///
/// Uses the shortest round-trip representation and always keeps a decimal
/// point, so re-running a stage writes byte-identical files.
pub fn format_amount(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_examples() {
        assert_eq!(parse_money("$1,234.00"), 1234.0);
        assert_eq!(parse_money("1234"), 1234.0);
        assert_eq!(parse_money("(500)"), -500.0);
        assert_eq!(parse_money(""), 0.0);
        assert_eq!(parse_money("NaN"), 0.0);
    }

    #[test]
    fn strips_million_suffix() {
        assert_eq!(parse_money("$12.5M"), 12.5);
        assert_eq!(parse_money(" 3.25m "), 3.25);
        assert_eq!(parse_money("($2.5M)"), -2.5);
    }

    #[test]
    fn placeholders_and_garbage_are_zero() {
        assert_eq!(parse_money("—"), 0.0);
        assert_eq!(parse_money("-"), 0.0);
        assert_eq!(parse_money("None"), 0.0);
        assert_eq!(parse_money("inf"), 0.0);
        assert_eq!(parse_money("twelve"), 0.0);
        assert_eq!(parse_money("()"), 0.0);
    }

    #[test]
    fn leading_minus_is_kept() {
        assert_eq!(parse_money("-$4.0"), -4.0);
    }

    #[test]
    fn year_parsing() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("2019.0"), Some(2019));
        assert_eq!(parse_year(" 2020 "), Some(2020));
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("2019.5"), None);
        assert_eq!(parse_year("abc"), None);
    }

    #[test]
    fn amount_formatting_is_stable() {
        assert_eq!(format_amount(1234.0), "1234.0");
        assert_eq!(format_amount(0.1), "0.1");
        assert_eq!(format_amount(-500.0), "-500.0");
    }
}
