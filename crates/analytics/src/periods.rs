//! Buckets trades by the calendar period of their exit time.

use crate::engine::AnalyticsEngine;
use crate::report::PerformanceReport;
use chrono::{Datelike, Days, NaiveDate};
use core_types::{Period, Trade};
use serde::Serialize;
use std::collections::HashMap;

/// Key of the bucket holding trades whose exit time cannot be interpreted.
pub const UNDATED_KEY: &str = "undated";

/// The bucket key of a date: `YYYY-MM-DD` for days, the Monday of the week
/// for weeks, `YYYY-MM` for months.
pub fn period_key(date: NaiveDate, period: Period) -> String {
    match period {
        Period::Day => date.format("%Y-%m-%d").to_string(),
        Period::Week => week_start(date).format("%Y-%m-%d").to_string(),
        Period::Month => date.format("%Y-%m").to_string(),
    }
}

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

fn trade_key(trade: &Trade, period: Period) -> String {
    trade
        .exit_instant()
        .map(|exit| period_key(exit.date(), period))
        .unwrap_or_else(|| UNDATED_KEY.to_string())
}

/// The trades of one period and the statistics over them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodGroup {
    pub key: String,
    pub trades: Vec<Trade>,
    pub stats: PerformanceReport,
}

/// A full partition of a trade sequence for one period, most recent bucket first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedTrades {
    pub period: Period,
    pub groups: Vec<PeriodGroup>,
}

impl GroupedTrades {
    pub fn get(&self, key: &str) -> Option<&PeriodGroup> {
        self.groups.iter().find(|group| group.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Partitions `trades` by the period of their exit time and computes statistics per bucket.
///
/// Every trade lands in exactly one bucket and keeps its relative order
/// there. Keys sort descending, which for these formats is newest first;
/// the undated bucket, if any, comes last.
pub fn group_by_period(trades: &[Trade], period: Period) -> GroupedTrades {
    let mut buckets: HashMap<String, Vec<Trade>> = HashMap::new();
    for trade in trades {
        buckets
            .entry(trade_key(trade, period))
            .or_default()
            .push(trade.clone());
    }

    let undated = buckets.remove(UNDATED_KEY);
    if let Some(undated) = &undated {
        tracing::debug!(count = undated.len(), "Trades with an unreadable exit time.");
    }

    let mut keyed: Vec<(String, Vec<Trade>)> = buckets.into_iter().collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.extend(undated.map(|trades| (UNDATED_KEY.to_string(), trades)));

    let engine = AnalyticsEngine::new();
    let groups = keyed
        .into_iter()
        .filter_map(|(key, trades)| {
            engine
                .calculate(&trades)
                .map(|stats| PeriodGroup { key, trades, stats })
        })
        .collect();

    GroupedTrades { period, groups }
}
