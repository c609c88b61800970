//! TradingView strategy log: `Time,Text` rows of free-text messages.
//!
//! A fill is a message containing "has been executed at price"; its direction
//! is only stated on a nearby "order to buy" / "order to sell" line. The log
//! trades one instrument at a time, so a single position is tracked.

use crate::detector::EXECUTION_PHRASE;
use crate::fields::{non_empty_lines, parse_number, split_record};
use crate::pairing::{ClosingSize, Fill, PairingRules, PositionBook};
use core_types::time::elapsed_millis;
use core_types::{Trade, TradeSide};
use regex::Regex;
use std::sync::LazyLock;

/// Lines examined for the order direction: the fill line and the four after it.
const SIDE_WINDOW: usize = 5;

// Keeps the fractional part: "at price 5700.25" is 5700.25, not 5700.
static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"at price (\d+(?:\.\d+)?)").expect("valid price pattern"));
static UNITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"for ([\d.]+) units").expect("valid units pattern"));

fn wall_clock(entry: &Fill, exit: &Fill) -> u64 {
    elapsed_millis(&entry.time, &exit.time).unwrap_or(0)
}

const RULES: PairingRules = PairingRules {
    closing_size: ClosingSize::Exit,
    duration: wall_clock,
};

fn side_near(lines: &[&str], index: usize) -> Option<TradeSide> {
    let end = (index + SIDE_WINDOW).min(lines.len());
    lines[index..end].iter().find_map(|line| {
        if line.contains("order to buy") {
            Some(TradeSide::Buy)
        } else if line.contains("order to sell") {
            Some(TradeSide::Sell)
        } else {
            None
        }
    })
}

fn parse_fill(lines: &[&str], index: usize) -> Option<Fill> {
    let fields = split_record(lines[index]);
    if fields.len() < 2 {
        return None;
    }
    let message = fields[1..].join(",");
    if !message.contains(EXECUTION_PHRASE) {
        return None;
    }

    let price = PRICE
        .captures(&message)
        .map(|c| parse_number(&c[1]))?;
    let size = UNITS
        .captures(&message)
        .map(|c| parse_number(&c[1]))
        .unwrap_or(1.0);

    let Some(side) = side_near(lines, index) else {
        tracing::debug!(line = lines[index], "Fill without an order direction nearby; discarded.");
        return None;
    };

    Some(Fill {
        time: fields[0].clone(),
        side,
        price,
        size,
    })
}

/// Converts a strategy log into round trips, most recent first.
pub fn parse(text: &str) -> Vec<Trade> {
    let lines: Vec<&str> = non_empty_lines(text).collect();

    (0..lines.len())
        .filter_map(|index| parse_fill(&lines, index))
        .fold(PositionBook::new(RULES), |book, fill| book.apply((), fill))
        .into_trades_newest_first()
}
