//! Column filter expressions typed into a header filter box.
//!
//! A filter text is an optional comparison operator followed by a threshold,
//! for example `>=5`, `< 0.5` or `12`. Operators are detected by containment
//! in a fixed priority order (`>=` before `>` and so on), the first match
//! wins, and the operator token is stripped before the threshold is parsed.
//!
//! Percentage columns store fractions, but users type what they see on
//! screen: `5.1` matches a stored `0.051`.
//!
//! Evaluation never fails. Anything that cannot be parsed degrades to a
//! plain `false` (or to a substring match for plain numeric columns).

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// How the cell value is compared against the typed threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Cell is a fraction; compared after multiplying by 100
    Percentage,
    /// Cell is compared unmodified; non-numeric input falls back to substring
    PlainNumeric,
}

impl ValueKind {
    /// Absolute tolerance used for equality
    pub fn tolerance(&self) -> f64 {
        match self {
            ValueKind::Percentage => 0.01,
            ValueKind::PlainNumeric => 0.0001,
        }
    }

    fn scale(&self, value: f64) -> f64 {
        match self {
            ValueKind::Percentage => value * 100.0,
            ValueKind::PlainNumeric => value,
        }
    }
}

/// Raw cell handed over by the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Number(f64),
    Text(&'a str),
    Empty,
}

impl CellValue<'_> {
    /// Numeric reading of the cell, if it has one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if !v.is_nan() => Some(*v),
            CellValue::Number(_) => None,
            CellValue::Text(s) => parse_number(s),
            CellValue::Empty => None,
        }
    }
}

impl fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
    Equal,
}

impl Comparison {
    pub fn holds(&self, value: f64, threshold: f64, tolerance: f64) -> bool {
        match self {
            Comparison::GreaterOrEqual => value >= threshold,
            Comparison::LessOrEqual => value <= threshold,
            Comparison::Greater => value > threshold,
            Comparison::Less => value < threshold,
            Comparison::Equal => (value - threshold).abs() < tolerance,
        }
    }
}

/// Operator tokens in detection order. `>=` must be tried before `>`.
const OPERATORS: [(&str, Comparison); 5] = [
    (">=", Comparison::GreaterOrEqual),
    ("<=", Comparison::LessOrEqual),
    (">", Comparison::Greater),
    ("<", Comparison::Less),
    ("=", Comparison::Equal),
];

/// A filter text split into its comparison and threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expression {
    pub comparison: Comparison,
    /// The operator token found, `None` for the bare-number default
    pub operator: Option<&'static str>,
    /// `None` when the remainder is not a number
    pub threshold: Option<f64>,
}

/// Split a filter text into comparison and threshold.
pub fn parse_expression(text: &str) -> Expression {
    for (token, comparison) in OPERATORS {
        if text.contains(token) {
            let rest = text.replacen(token, "", 1);
            return Expression {
                comparison,
                operator: Some(token),
                threshold: parse_number(rest.trim()),
            };
        }
    }

    Expression {
        comparison: Comparison::Equal,
        operator: None,
        threshold: parse_number(text),
    }
}

/// Decide whether a cell matches the filter text.
pub fn evaluate(filter_text: &str, cell: CellValue<'_>, kind: ValueKind) -> bool {
    if filter_text.is_empty() {
        return true;
    }

    let Some(raw) = cell.as_number() else {
        return match kind {
            ValueKind::Percentage => false,
            ValueKind::PlainNumeric => contains_ignore_case(&cell.to_string(), filter_text),
        };
    };

    let value = kind.scale(raw);
    let expression = parse_expression(filter_text);

    match (expression.threshold, expression.operator) {
        (Some(threshold), _) => expression
            .comparison
            .holds(value, threshold, kind.tolerance()),
        // Bare text on a numeric column is only legal for plain numbers
        (None, None) if kind == ValueKind::PlainNumeric => {
            contains_ignore_case(&cell.to_string(), filter_text)
        }
        (None, _) => false,
    }
}

/// Header filter for text columns: case-insensitive substring.
pub fn matches_text(filter_text: &str, cell: CellValue<'_>) -> bool {
    if filter_text.is_empty() {
        return true;
    }
    match cell {
        CellValue::Empty => false,
        other => contains_ignore_case(&other.to_string(), filter_text),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// Longest numeric prefix after leading whitespace. ASCII digits only.
static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?))")
        .expect("number prefix pattern is valid")
});

/// Lenient number parsing: the longest numeric prefix after leading
/// whitespace, so `"5%"` reads as 5 and `"abc"` as nothing.
pub fn parse_number(text: &str) -> Option<f64> {
    let captures = NUMBER_PREFIX.captures(text)?;
    captures.get(1)?.as_str().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use ValueKind::{Percentage, PlainNumeric};

    fn pct(filter: &str, value: f64) -> bool {
        evaluate(filter, CellValue::Number(value), Percentage)
    }

    fn plain(filter: &str, value: f64) -> bool {
        evaluate(filter, CellValue::Number(value), PlainNumeric)
    }

    #[test]
    fn test_empty_filter_always_matches() {
        assert!(pct("", 0.5));
        assert!(evaluate("", CellValue::Empty, Percentage));
        assert!(evaluate("", CellValue::Text("xyz"), PlainNumeric));
    }

    #[test]
    fn test_operator_priority() {
        assert!(pct(">=5", 0.06));
        assert!(pct(">=5", 0.05));
        assert!(!pct(">5", 0.05));
        assert!(pct("<=5", 0.05));
        assert!(!pct("<5", 0.05));
        assert!(pct("<5", 0.049));
    }

    #[test]
    fn test_parse_expression_first_match_wins() {
        let e = parse_expression(">=5");
        assert_eq!(e.comparison, Comparison::GreaterOrEqual);
        assert_eq!(e.threshold, Some(5.0));

        let e = parse_expression("<= 2.5");
        assert_eq!(e.comparison, Comparison::LessOrEqual);
        assert_eq!(e.threshold, Some(2.5));

        let e = parse_expression("=7");
        assert_eq!(e.operator, Some("="));
        assert_eq!(e.threshold, Some(7.0));

        let e = parse_expression("7");
        assert_eq!(e.comparison, Comparison::Equal);
        assert_eq!(e.operator, None);
    }

    #[test]
    fn test_operator_found_anywhere_in_text() {
        // Containment, not prefix: "5>" strips to "5"
        let e = parse_expression("5>");
        assert_eq!(e.comparison, Comparison::Greater);
        assert_eq!(e.threshold, Some(5.0));
    }

    #[test]
    fn test_percentage_equality_tolerance() {
        assert!(pct("=5", 0.0501));
        assert!(!pct("=5", 0.052));
        assert!(pct("5.1", 0.051));
    }

    #[test]
    fn test_default_equals_explicit_equals() {
        for v in [0.0, 0.05, 0.0501, 0.052, -0.05, 1.0] {
            assert_eq!(pct("5", v), pct("=5", v), "value {}", v);
            assert_eq!(plain("5", v * 100.0), plain("=5", v * 100.0));
        }
    }

    #[test]
    fn test_plain_numeric_uses_tight_tolerance() {
        assert!(plain("=41", 41.0));
        assert!(plain("41", 41.00005));
        assert!(!plain("41", 41.001));
        assert!(plain(">40", 41.0));
    }

    #[test]
    fn test_unparsable_threshold_never_matches() {
        assert!(!pct(">=abc", 0.5));
        assert!(!plain(">abc", 12.0));
        assert!(!pct("abc", 0.5));
    }

    #[test]
    fn test_plain_numeric_substring_fallback() {
        assert!(evaluate("abc", CellValue::Text("abcdef"), PlainNumeric));
        assert!(evaluate("ABC", CellValue::Text("xabcx"), PlainNumeric));
        assert!(!evaluate("abc", CellValue::Number(123.0), PlainNumeric));
        assert!(!evaluate("abc", CellValue::Empty, PlainNumeric));
    }

    #[test]
    fn test_non_numeric_cell_never_matches_percentage() {
        assert!(!evaluate("5", CellValue::Empty, Percentage));
        assert!(!evaluate(">0", CellValue::Text("n/a"), Percentage));
        assert!(!evaluate("5", CellValue::Number(f64::NAN), Percentage));
    }

    #[test]
    fn test_threshold_with_trailing_text() {
        assert!(pct(">5%", 0.06));
        assert!(pct("  3 ", 0.03));
    }

    #[test]
    fn test_parse_number_prefixes() {
        assert_eq!(parse_number("5"), Some(5.0));
        assert_eq!(parse_number(" -2.5x"), Some(-2.5));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("1e"), Some(1.0));
        assert_eq!(parse_number("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("+.5"), Some(0.5));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_number("0x10"), Some(0.0));
        assert_eq!(parse_number("5e+"), Some(5.0));
        assert_eq!(parse_number("\u{0663}"), None);
        assert_eq!(parse_number("12\u{0663}"), Some(12.0));
    }

    #[test]
    fn test_text_match_is_case_insensitive() {
        assert!(matches_text("dix", CellValue::Text("Dixon Tech")));
        assert!(!matches_text("fortis", CellValue::Text("Dixon Tech")));
        assert!(!matches_text("bonus", CellValue::Empty));
        assert!(matches_text("", CellValue::Empty));
    }
}
