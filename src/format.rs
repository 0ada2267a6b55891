//! Label formatting: XP magnitudes, dates, ratios, percents.
//!
//! The `XP`/`KB`/`MB` suffixes are the platform's own stylized units for XP,
//! not byte sizes; they are kept verbatim so labels match the platform UI.

use crate::stats::AuditRatio;
use chrono::{DateTime, Utc};
use num_format::{Locale, ToFormattedString};

/// Which date rendering the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// Short month + two-digit year, e.g. `Apr 24`.
    Axis,
    /// Full date for hover text, e.g. `Apr 1, 2024`.
    Tooltip,
}

/// `< 1000` -> `"{n} XP"`, `< 1_000_000` -> `"{n/1000:.2} KB"`, else `"{n/1e6:.2} MB"`.
/// Negative values are always below 1000 and keep the `XP` unit.
pub fn format_magnitude(n: i64) -> String {
    if n < 1_000 {
        format!("{n} XP")
    } else if n < 1_000_000 {
        format!("{:.2} KB", n as f64 / 1_000.0)
    } else {
        format!("{:.2} MB", n as f64 / 1_000_000.0)
    }
}

/// Same scaling for fractional magnitudes (grid values); whole `XP` below 1000.
pub fn format_magnitude_f64(v: f64) -> String {
    if !v.is_finite() {
        return "0 XP".to_string();
    }
    format_magnitude(v.round() as i64)
}

/// Exact amount with thousands separators, e.g. `12,345 XP`.
pub fn format_amount(n: i64) -> String {
    format!("{} XP", n.to_formatted_string(&Locale::en))
}

pub fn format_date(d: &DateTime<Utc>, style: DateStyle) -> String {
    match style {
        DateStyle::Axis => d.format("%b %y").to_string(),
        DateStyle::Tooltip => d.format("%b %-d, %Y").to_string(),
    }
}

/// One decimal, or `N/A` when nothing was received.
pub fn format_ratio(ratio: AuditRatio) -> String {
    match ratio.value() {
        Some(r) if r.is_finite() => format!("{r:.1}"),
        _ => "N/A".to_string(),
    }
}

/// `0.42` -> `42%`.
pub fn format_percent(level: f64) -> String {
    if !level.is_finite() {
        return "0%".to_string();
    }
    format!("{:.0}%", level * 100.0)
}
