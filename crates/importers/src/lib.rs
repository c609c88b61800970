//! # Tradebook Importers
//!
//! Turns raw broker export text into normalized `Trade` records.
//!
//! - `detector`: recognizes the platform an export came from.
//! - `tradovate`, `thinkorswim`, `tradingview`: one parser per platform.
//! - `pairing`: rebuilds round trips from raw execution logs.
//!
//! Parsers never fail on bad data. Malformed rows are skipped or carried as
//! NaN values, and every parser returns a (possibly empty) trade list.

pub mod detector;
pub mod fields;
pub mod pairing;
pub mod thinkorswim;
pub mod tradingview;
pub mod tradovate;

use core_types::{PlatformFormat, Trade};

pub use detector::detect_format;

/// Parses `text` with the parser for `format`.
pub fn parse(text: &str, format: PlatformFormat) -> Vec<Trade> {
    let trades = match format {
        PlatformFormat::Tradovate => tradovate::parse(text),
        PlatformFormat::ThinkOrSwim => thinkorswim::parse(text),
        PlatformFormat::TradingView => tradingview::parse(text),
    };
    tracing::debug!(format = %format, trades = trades.len(), "Export parsed.");
    trades
}

/// Parses `text` with the parser named by `tag`. An unsupported tag yields no trades.
pub fn parse_tagged(text: &str, tag: &str) -> Vec<Trade> {
    match tag.parse::<PlatformFormat>() {
        Ok(format) => parse(text, format),
        Err(e) => {
            tracing::warn!(tag, error = %e, "Unsupported export format tag.");
            Vec::new()
        }
    }
}
