use crate::error::EngineError;
use analytics::{GroupedTrades, PerformanceReport, compute_statistics, group_by_period};
use core_types::{Period, PlatformFormat, Trade, ViewMode};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

pub mod error;

/// Everything derived from one successfully parsed export.
///
/// Built in one pass and never updated in place; a new upload builds a new `Dataset`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub format: PlatformFormat,
    pub trades: Vec<Trade>,
    /// All-time statistics, absent when the export produced no trades.
    pub stats: Option<PerformanceReport>,
    pub by_day: GroupedTrades,
    pub by_week: GroupedTrades,
    pub by_month: GroupedTrades,
}

impl Dataset {
    pub fn build(format: PlatformFormat, trades: Vec<Trade>) -> Self {
        Self {
            format,
            stats: compute_statistics(&trades),
            by_day: group_by_period(&trades, Period::Day),
            by_week: group_by_period(&trades, Period::Week),
            by_month: group_by_period(&trades, Period::Month),
            trades,
        }
    }

    pub fn grouped(&self, period: Period) -> &GroupedTrades {
        match period {
            Period::Day => &self.by_day,
            Period::Week => &self.by_week,
            Period::Month => &self.by_month,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// What a caller renders for a selected `ViewMode`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum View<'a> {
    AllTime(Option<&'a PerformanceReport>),
    Periods(&'a GroupedTrades),
}

/// The orchestrator. Holds the single active dataset and, when detection fails,
/// the upload that is waiting for an explicit format choice.
#[derive(Debug, Default)]
pub struct Journal {
    active: Option<Dataset>,
    pending: Option<String>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detects the format of `text` and replaces the active dataset with its trades.
    ///
    /// When the format cannot be recognized the text is kept as the pending upload, the
    /// current dataset is left alone and `EngineError::UnrecognizedFormat` is returned.
    pub fn ingest(&mut self, text: String) -> Result<&Dataset, EngineError> {
        match importers::detect_format(&text) {
            Some(format) => Ok(self.ingest_as(&text, format)),
            None => {
                warn!("Export format not recognized; waiting for an explicit choice");
                self.pending = Some(text);
                Err(EngineError::UnrecognizedFormat)
            }
        }
    }

    /// Parses the pending upload with a format chosen by the user.
    pub fn choose_format(&mut self, format: PlatformFormat) -> Result<&Dataset, EngineError> {
        let text = self.pending.take().ok_or(EngineError::NoPendingUpload)?;
        Ok(self.ingest_as(&text, format))
    }

    /// Parses `text` as `format` without running detection.
    pub fn ingest_as(&mut self, text: &str, format: PlatformFormat) -> &Dataset {
        let dataset = Dataset::build(format, importers::parse(text, format));
        info!(
            format = %format,
            trades = dataset.trades.len(),
            "Replacing active dataset"
        );
        self.pending = None;
        self.active.insert(dataset)
    }

    /// Drops the pending upload, if any, and hands it back.
    pub fn cancel_pending(&mut self) -> Option<String> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.active.as_ref()
    }

    /// The statistics or period buckets for `mode`, or `None` before anything was ingested.
    pub fn view(&self, mode: ViewMode) -> Option<View<'_>> {
        let dataset = self.active.as_ref()?;
        Some(match mode.period() {
            None => View::AllTime(dataset.stats.as_ref()),
            Some(period) => View::Periods(dataset.grouped(period)),
        })
    }
}

/// Reads an export file into memory. This is the engine's only I/O.
pub async fn read_export(path: impl AsRef<Path>) -> Result<String, EngineError> {
    Ok(tokio::fs::read_to_string(path).await?)
}
