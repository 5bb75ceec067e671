// Parsing and formatting helpers.
//
// Every value that crosses from the raw snapshot into the pipeline goes
// through `parse_number`, and every number that leaves for display goes
// through one of the `format_*` functions, so the rest of the crate only
// ever sees plain `f64`s.
use crate::types::RawValue;
use num_format::{Locale, ToFormattedString};

/// Sentinel spelling used by the source exports for "no value".
pub const NONE_LABEL: &str = "(None)";

/// Rendered in place of a ratio whose denominator is zero.
pub const DASH: &str = "-";

/// Coerce a raw field value into a number. This never fails:
///
/// - missing / null values become `0`,
/// - numbers pass through unchanged,
/// - text is trimmed; `""`, `"-"` and the `(None)` sentinel become `0`,
/// - `"(1,234)"` is read as `-1234`,
/// - thousands separators and percent signs are stripped (`"12.5%"` is `12.5`),
/// - anything that still does not parse as a finite decimal becomes `0`.
pub fn parse_number(raw: &RawValue) -> f64 {
    match raw {
        RawValue::Null => 0.0,
        RawValue::Number(n) => *n,
        RawValue::Text(s) => parse_number_str(s),
    }
}

pub fn parse_number_str(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() || s == DASH || s.eq_ignore_ascii_case(NONE_LABEL) {
        return 0.0;
    }
    let (negative, body) = match s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        Some(inner) if !inner.is_empty() => (true, inner),
        _ => (false, s),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| *c != ',' && *c != '%')
        .collect();
    match cleaned.trim().parse::<f64>() {
        // `f64::from_str` accepts "inf" and "NaN", which are not amounts.
        Ok(n) if n.is_finite() => {
            if negative {
                -n
            } else {
                n
            }
        }
        _ => 0.0,
    }
}

/// `numerator / denominator`, or the sentinel `0` when the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with `en` thousands separators, e.g. `1,234,567.89`.
    if !n.is_finite() {
        return DASH.to_string();
    }
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = group_digits(int_part, Locale::en.separator());
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // Don't print "-0.00" for values that round to zero.
    let rounds_to_zero = s.chars().all(|c| c == '0' || c == '.');
    if n.is_sign_negative() && !rounds_to_zero {
        format!("-{}", res)
    } else {
        res
    }
}

// Groups of three from the right; works past the range of any integer type.
fn group_digits(digits: &str, separator: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

/// Locale-grouped numeral with at most two fractional digits: `1,000`,
/// `1,234.5`, `0.33`. Infinities and NaN show as a dash.
pub fn format_display(n: f64) -> String {
    if !n.is_finite() {
        return DASH.to_string();
    }
    let fixed = format_number(n, 2);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// A ratio rendered as a percentage with two decimals, e.g. `0.5` -> `50.00%`.
pub fn format_percent(ratio: f64) -> String {
    if !ratio.is_finite() {
        return DASH.to_string();
    }
    format!("{}%", format_number(ratio * 100.0, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `9,855 records loaded`).
    n.to_formatted_string(&Locale::en)
}
