// Display formatting shared by classifiers and charts.
// Dates are rendered en-US short style in UTC.

use chrono::{DateTime, Utc};

/// `Jan 5, 2024`
pub fn format_short_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `Jan 5` (XP chart x-axis)
pub fn format_axis_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d").to_string()
}

/// Display name for a skill transaction type such as `skill_sys-admin`
pub fn skill_display_name(skill_type: &str) -> String {
    let base = skill_type.replacen("skill_", "", 1);

    let known = match base.as_str() {
        "js" => Some("JavaScript"),
        "css" => Some("CSS"),
        "html" => Some("HTML"),
        "go" => Some("Go"),
        "sql" => Some("SQL"),
        "tcp" => Some("TCP"),
        "sys-admin" => Some("System Admin"),
        "back-end" => Some("Back-End"),
        "front-end" => Some("Front-End"),
        "algo" => Some("Algorithms"),
        "prog" => Some("Programming"),
        "unix" => Some("Unix"),
        "docker" => Some("Docker"),
        "game" => Some("Game Development"),
        _ => None,
    };

    if let Some(name) = known {
        return name.to_string();
    }

    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// XP amount with a magnitude suffix and 3 significant digits:
/// `950`, `1.23KB`, `45.6KB`, `789KB`, `2.05MB`. Rounding that reaches
/// 1000 moves up a unit (`999_999` is `1.00MB`).
pub fn format_xp(xp: i64) -> String {
    let value = xp as f64;
    if value >= 1_000_000.0 {
        three_significant(value / 1_000_000.0, "MB")
    } else if value >= 1_000.0 {
        let kb = value / 1_000.0;
        if round_significant(kb).0 >= 1_000.0 {
            three_significant(value / 1_000_000.0, "MB")
        } else {
            three_significant(kb, "KB")
        }
    } else {
        xp.to_string()
    }
}

fn decimals_for(value: f64) -> usize {
    if value < 10.0 {
        2
    } else if value < 100.0 {
        1
    } else {
        0
    }
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Rounded value and its decimal count, taken from the rounded magnitude
fn round_significant(value: f64) -> (f64, usize) {
    let decimals = decimals_for(value);
    let rounded = round_to(value, decimals);
    let settled = decimals_for(rounded);
    if settled < decimals {
        (round_to(value, settled), settled)
    } else {
        (rounded, decimals)
    }
}

fn three_significant(value: f64, suffix: &str) -> String {
    let (rounded, decimals) = round_significant(value);
    format!("{:.*}{}", decimals, rounded, suffix)
}

/// Unit for the audit ratio chart, chosen by the larger of the two values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ByteUnit {
    pub name: &'static str,
    pub divisor: f64,
}

pub fn byte_unit_for(max_value: f64) -> ByteUnit {
    if max_value >= 1_000_000_000.0 {
        ByteUnit { name: "GB", divisor: 1_000_000_000.0 }
    } else if max_value >= 1_000_000.0 {
        ByteUnit { name: "MB", divisor: 1_000_000.0 }
    } else if max_value >= 1_000.0 {
        ByteUnit { name: "KB", divisor: 1_000.0 }
    } else {
        ByteUnit { name: "Bytes", divisor: 1.0 }
    }
}

/// Grade with 2 decimals, or `sentinel` when ungraded
pub fn format_grade(grade: Option<f64>, sentinel: &str) -> String {
    match grade {
        Some(g) => format!("{:.2}", g),
        None => sentinel.to_string(),
    }
}

/// Compact number for SVG attributes: at most 2 decimals, no trailing zeros
pub fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
