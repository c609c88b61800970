//! # Tradebook Analytics Engine
//!
//! This crate turns a sequence of normalized trades into performance statistics.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O and no knowledge of export formats. It depends
//!   only on `core-types`.
//! - **Stateless Calculation:** The `AnalyticsEngine` takes a trade slice and
//!   produces a fresh `PerformanceReport`. Nothing is updated incrementally.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: computes a `PerformanceReport`, or nothing for an empty sequence.
//! - `group_by_period`: day, week and month buckets with per-bucket statistics.
//! - `MonthCalendar`: a month grid with per-day statistics.
//! - `format`: display helpers for money, durations and period labels.

// Declare the modules that constitute this crate.
pub mod calendar;
pub mod engine;
pub mod error;
pub mod format;
pub mod periods;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use calendar::{CalendarDay, MonthCalendar};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use periods::{GroupedTrades, PeriodGroup, group_by_period};
pub use report::{EquityPoint, PerformanceReport};

/// Convenience wrapper around `AnalyticsEngine::calculate`.
pub fn compute_statistics(trades: &[core_types::Trade]) -> Option<PerformanceReport> {
    AnalyticsEngine::new().calculate(trades)
}
