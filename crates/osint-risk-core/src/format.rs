//! Display helpers for engine outputs.
//!
//! Every function is pure and total over its input domain.

use crate::leaks::parse_leak_date;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";
/// Maximum characters kept by [`extract_filename`].
pub const FILENAME_CAP: usize = 40;

/// Whole-dollar US currency, e.g. `450000000.0` → `$450,000,000`.
///
/// Halves round away from zero; non-finite amounts render as `$0`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let rounded = amount.round();
    let digits = group_thousands(&format!("{:.0}", rounded.abs()));
    if rounded < 0.0 {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

/// Thousands-separated integer, e.g. `1234567` → `1,234,567`.
pub fn format_number(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Compact magnitude with one decimal: `1.5B`, `2.3M`, `4.0K`, or the plain integer below 1000.
///
/// The unit is picked after rounding, so `999_950` is `1.0M` rather than `1000.0K`.
pub fn abbreviate_number(value: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000, "K"), (1_000_000, "M"), (1_000_000_000, "B")];
    if value < UNITS[0].0 {
        return value.to_string();
    }
    let mut picked = UNITS[0];
    for (scale, suffix) in UNITS {
        if value >= scale || rounded_tenths(value, picked.0) >= 10_000 {
            picked = (scale, suffix);
        }
    }
    let (scale, suffix) = picked;
    let tenths = rounded_tenths(value, scale);
    format!("{}.{}{suffix}", tenths / 10, tenths % 10)
}

/// `value / scale` in tenths, halves rounded up.
fn rounded_tenths(value: u64, scale: u64) -> u128 {
    let scale = u128::from(scale);
    (u128::from(value) * 10 + scale / 2) / scale
}

/// North-American formatting for 10 and 11 digit numbers; anything else only gains a `+`.
///
/// This is a permissive display fallback, not a validator.
pub fn format_phone(raw: &str) -> String {
    let raw = raw.trim();
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("+1 ({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ if raw.is_empty() || raw.starts_with('+') => raw.to_string(),
        _ => format!("+{raw}"),
    }
}

/// Cut `text` to `max_chars` characters and append [`ELLIPSIS`]; shorter text is returned as-is.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Last path segment of a URL, without query or fragment, capped at [`FILENAME_CAP`].
pub fn extract_filename(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(url);
    truncate_text(name, FILENAME_CAP)
}

/// `2023-01-05` → `Jan 5, 2023`. Unparseable input is returned unchanged.
pub fn format_date(raw: &str) -> String {
    match parse_leak_date(raw) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
