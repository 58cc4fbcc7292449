use regex::Regex;
use std::sync::LazyLock;

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:\.(\d+))?").expect("valid number pattern"));

/// Number of significant digits of `value` as written in its shortest
/// round-trip decimal form. Trailing fractional zeros never appear in that
/// form, so they never count. A zero whole part, or a value that is not a
/// finite number, yields 0.
pub fn significant_digits(value: f64) -> usize {
    if !value.is_finite() {
        return 0;
    }
    let rendered = value.to_string();
    let Some(captures) = NUMBER_PATTERN.captures(&rendered) else {
        return 0;
    };
    let whole = captures.get(1).map_or("", |m| m.as_str());
    let fraction = captures.get(2).map_or("", |m| m.as_str());
    if whole == "0" {
        0
    } else {
        whole.len() + fraction.len()
    }
}

/// Rounds `value` to `digits` significant digits. Zero digits leaves the
/// value untouched.
pub fn round_to_significant(value: f64, digits: usize) -> f64 {
    if digits == 0 || !value.is_finite() {
        return value;
    }
    format!("{:.*e}", digits - 1, value)
        .parse()
        .unwrap_or(value)
}
