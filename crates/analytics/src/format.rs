//! Formatting utilities for displaying reports.

use crate::report::PerformanceReport;
use chrono::{Days, NaiveDate};
use core_types::Period;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const NOT_AVAILABLE: &str = "n/a";

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Formats a dollar amount with thousands separators and cents: `-$1,234.50`.
#[must_use]
pub fn format_currency(value: f64) -> String {
    let Some(amount) = Decimal::from_f64(value) else {
        return NOT_AVAILABLE.to_string();
    };
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Short form for tight spaces such as calendar cells: `$1.2k` from one thousand up.
#[must_use]
pub fn format_compact_currency(value: f64) -> String {
    let Some(amount) = Decimal::from_f64(value) else {
        return NOT_AVAILABLE.to_string();
    };
    if amount.abs() < Decimal::ONE_THOUSAND {
        return format_currency(value);
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    let thousands = (amount.abs() / Decimal::ONE_THOUSAND)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{sign}${thousands:.1}k")
}

/// Compact form with an explicit `+` for gains, as shown in calendar cells.
#[must_use]
pub fn format_signed_compact_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", format_compact_currency(value))
    } else {
        format_compact_currency(value)
    }
}

/// Formats a signed amount with an explicit `+` for gains.
#[must_use]
pub fn format_signed_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", format_currency(value))
    } else {
        format_currency(value)
    }
}

/// Formats a holding time in milliseconds as `2h 5m` or `7m`.
#[must_use]
pub fn format_duration(ms: f64) -> String {
    if !ms.is_finite() || ms < 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    let minutes = (ms / 60_000.0).floor() as u64;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

/// Formats a percentage with the given number of decimals: `41.7%`.
#[must_use]
pub fn format_pct(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}%")
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// Human readable label for a period bucket key.
///
/// Keys that do not parse for the given period are returned unchanged.
#[must_use]
pub fn period_label(key: &str, period: Period) -> String {
    let label = match period {
        Period::Day => NaiveDate::parse_from_str(key, "%Y-%m-%d")
            .ok()
            .map(|d| d.format("%a, %b %-d, %Y").to_string()),
        Period::Week => NaiveDate::parse_from_str(key, "%Y-%m-%d").ok().map(|start| {
            let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
            format!("Week of {} - {}", start.format("%b %-d"), end.format("%b %-d"))
        }),
        Period::Month => NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
            .ok()
            .map(|d| d.format("%B %Y").to_string()),
    };
    label.unwrap_or_else(|| key.to_string())
}

/// Average win over average loss, `None` when there are no losses to divide by.
#[must_use]
pub fn win_loss_ratio(report: &PerformanceReport) -> Option<f64> {
    (report.avg_loss != 0.0).then(|| (report.avg_win / report.avg_loss).abs())
}
