use regex::Regex;
use std::sync::LazyLock;

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?|\.\d+").expect("valid regex"));

/// Parses the first numeric substring of a displayed price
///
/// Currency symbols and any other non-numeric prefix are ignored, so
/// `"£51.77"` and `"$12.00"` both parse. Returns `None` when there is no
/// numeric substring or the value is not a positive finite number.
pub fn parse_price(text: &str) -> Option<f64> {
    let digits = NUMERIC.find(text)?.as_str();
    let value: f64 = digits.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}
