//! Month-at-a-glance view: a Sunday-first day grid with statistics per trading day.

use crate::engine::AnalyticsEngine;
use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use chrono::{Datelike, NaiveDate};
use core_types::Trade;
use serde::Serialize;
use std::collections::BTreeMap;

/// One calendar row, Sunday through Saturday. `None` pads days outside the month.
pub type CalendarWeek = [Option<u32>; 7];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date_key: String,
    pub trades: Vec<Trade>,
    pub stats: PerformanceReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCalendar {
    pub key: String,
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub weeks: Vec<CalendarWeek>,
    /// Days with at least one exit, keyed by day of month.
    pub days: BTreeMap<u32, CalendarDay>,
    /// Statistics over every trade that exited in this month.
    pub stats: Option<PerformanceReport>,
}

impl MonthCalendar {
    /// Builds the calendar for `month_key` (`YYYY-MM`) from the trades exiting in that month.
    ///
    /// Trades exiting in other months, or with an unreadable exit time, are ignored.
    pub fn build(month_key: &str, trades: &[Trade]) -> Result<Self, AnalyticsError> {
        let first = parse_month_key(month_key)?;
        let (year, month) = (first.year(), first.month());
        let days_in_month = days_in_month(first);

        let mut by_day: BTreeMap<u32, Vec<Trade>> = BTreeMap::new();
        let mut in_month = Vec::new();
        for trade in trades {
            let Some(exit) = trade.exit_instant() else {
                continue;
            };
            let date = exit.date();
            if date.year() == year && date.month() == month {
                by_day.entry(date.day()).or_default().push(trade.clone());
                in_month.push(trade.clone());
            }
        }

        let engine = AnalyticsEngine::new();
        let days = by_day
            .into_iter()
            .filter_map(|(day, trades)| {
                let stats = engine.calculate(&trades)?;
                let date_key = format!("{year:04}-{month:02}-{day:02}");
                Some((day, CalendarDay { date_key, trades, stats }))
            })
            .collect();

        Ok(Self {
            key: format!("{year:04}-{month:02}"),
            year,
            month,
            days_in_month,
            weeks: week_grid(first, days_in_month),
            days,
            stats: engine.calculate(&in_month),
        })
    }

    /// Number of distinct days with at least one exit.
    pub fn trading_days(&self) -> usize {
        self.days.len()
    }

    pub fn day(&self, day: u32) -> Option<&CalendarDay> {
        self.days.get(&day)
    }
}

fn parse_month_key(key: &str) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::parse_from_str(&format!("{}-01", key.trim()), "%Y-%m-%d")
        .map_err(|_| AnalyticsError::InvalidPeriodKey(key.to_string()))
}

fn days_in_month(first: NaiveDate) -> u32 {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

fn week_grid(first: NaiveDate, days_in_month: u32) -> Vec<CalendarWeek> {
    let offset = first.weekday().num_days_from_sunday() as usize;
    let mut weeks = Vec::new();
    let mut week: CalendarWeek = [None; 7];

    for day in 1..=days_in_month {
        let slot = (offset + day as usize - 1) % 7;
        week[slot] = Some(day);
        if slot == 6 {
            weeks.push(week);
            week = [None; 7];
        }
    }
    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }

    weeks
}
