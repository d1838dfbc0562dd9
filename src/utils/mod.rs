//! Utility functions for formatting and common operations
//!
//! This module provides centralized formatting utilities for consistent
//! display of percentages, counts, rupee amounts and quantities in the
//! holdings table and the totals summary.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Digit grouping convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// 1,234,567
    Western,
    /// 12,34,567 (thousand, then lakh and crore)
    Indian,
}

/// Longest company name shown before truncation
pub const NAME_DISPLAY_WIDTH: usize = 30;

/// Core formatting function with full control over output.
///
/// Rounds half away from zero to at most `max_fraction` digits, drops
/// trailing zeros and groups the integer part.
///
/// # Examples
/// ```
/// use midcap::utils::{format_decimal, Grouping};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_decimal(dec!(1234567.891), 2, Grouping::Indian), "12,34,567.89");
/// assert_eq!(format_decimal(dec!(1234567.5), 0, Grouping::Western), "1,234,568");
/// ```
pub fn format_decimal(value: Decimal, max_fraction: u32, grouping: Grouping) -> String {
    let rounded = value
        .round_dp_with_strategy(max_fraction, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let text = rounded.abs().to_string();
    let (integer_part, fraction_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let grouped = group_digits(integer_part, grouping);
    match fraction_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn group_digits(digits: &str, grouping: Grouping) -> String {
    let mut out: Vec<char> = Vec::with_capacity(digits.len() + digits.len() / 2);
    for (i, c) in digits.chars().rev().enumerate() {
        let boundary = match grouping {
            Grouping::Western => i > 0 && i % 3 == 0,
            Grouping::Indian => i == 3 || (i > 3 && (i - 3) % 2 == 0),
        };
        if boundary {
            out.push(',');
        }
        out.push(c);
    }
    out.into_iter().rev().collect()
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

// ============ Convenience functions ============

/// Fraction as a one-decimal percentage: `0.051` → `"5.1%"`.
///
/// # Examples
/// ```
/// use midcap::utils::format_percent;
///
/// assert_eq!(format_percent(Some(0.051), ""), "5.1%");
/// assert_eq!(format_percent(None, "N/A"), "N/A");
/// ```
pub fn format_percent(value: Option<f64>, absent: &str) -> String {
    match value {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => absent.to_string(),
    }
}

/// Fund count with thousands separators, blank when absent.
pub fn format_count(value: Option<u64>) -> String {
    value
        .map(|v| group_digits(&v.to_string(), Grouping::Western))
        .unwrap_or_default()
}

/// Rupee amount without decimals: `"₹83,105"`.
pub fn format_rupees(value: Option<f64>) -> String {
    value
        .and_then(to_decimal)
        .map(|d| format!("₹{}", format_decimal(d, 0, Grouping::Western)))
        .unwrap_or_default()
}

/// Quantity with thousands separators and up to three decimals.
pub fn format_quantity(value: Option<f64>) -> String {
    value
        .and_then(to_decimal)
        .map(|d| format_decimal(d, 3, Grouping::Western))
        .unwrap_or_default()
}

/// Cut long names to the display width, marking the cut with `...`.
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_DISPLAY_WIDTH {
        let cut: String = name.chars().take(NAME_DISPLAY_WIDTH).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}
