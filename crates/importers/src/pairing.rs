//! Reconstruction of round-trip trades from raw execution logs.
//!
//! The book is an explicit accumulator folded over the fills in file order:
//! one pending entry per key, closed by the first opposite-side fill for that
//! key. Formats that trade one instrument at a time use `()` as the key.

use core_types::{Leg, Trade, TradeSide};
use std::collections::HashMap;
use std::hash::Hash;

/// A single execution read from an export.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub time: String,
    pub side: TradeSide,
    pub price: f64,
    pub size: f64,
}

/// Which fill's quantity a round trip is booked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosingSize {
    Entry,
    Exit,
}

/// Format-specific knobs for closing a position.
#[derive(Debug, Clone, Copy)]
pub struct PairingRules {
    pub closing_size: ClosingSize,
    /// Holding time in milliseconds between an entry and its exit.
    pub duration: fn(&Fill, &Fill) -> u64,
}

/// Profit of a round trip: long gains when price rises, short when it falls.
pub fn realized_pnl(entry_side: TradeSide, entry_price: f64, exit_price: f64, size: f64) -> f64 {
    match entry_side {
        TradeSide::Buy => (exit_price - entry_price) * size,
        TradeSide::Sell => (entry_price - exit_price) * size,
    }
}

/// What happens when a fill arrives on the same side as the open entry.
///
/// The open entry is kept as it was and the additional fill is dropped, so a
/// scaled-in position is booked with the first fill's price and size only.
pub fn on_same_side_fill(open: Fill, addition: &Fill) -> Fill {
    tracing::debug!(
        open_time = %open.time,
        fill_time = %addition.time,
        side = %addition.side,
        "Same-side fill while a position is open; fill ignored."
    );
    open
}

fn close(entry: Fill, exit: Fill, rules: &PairingRules) -> Trade {
    let size = match rules.closing_size {
        ClosingSize::Entry => entry.size,
        ClosingSize::Exit => exit.size,
    };
    let pnl = realized_pnl(entry.side, entry.price, exit.price, size);
    let duration_ms = (rules.duration)(&entry, &exit);

    Trade::round_trip(
        entry.side,
        Leg::new(entry.time, entry.price),
        Leg::new(exit.time, exit.price),
        size,
        pnl,
        duration_ms,
    )
}

/// Open entries keyed by instrument plus the round trips closed so far.
#[derive(Debug)]
pub struct PositionBook<K> {
    rules: PairingRules,
    open: HashMap<K, Fill>,
    closed: Vec<Trade>,
}

impl<K: Hash + Eq> PositionBook<K> {
    pub fn new(rules: PairingRules) -> Self {
        Self {
            rules,
            open: HashMap::new(),
            closed: Vec::new(),
        }
    }

    /// Applies one fill and returns the updated book. Meant to be used with `Iterator::fold`.
    pub fn apply(mut self, key: K, fill: Fill) -> Self {
        match self.open.remove(&key) {
            None => {
                self.open.insert(key, fill);
            }
            Some(entry) if fill.side == entry.side.opposite() => {
                let trade = close(entry, fill, &self.rules);
                self.closed.push(trade);
            }
            Some(entry) => {
                let kept = on_same_side_fill(entry, &fill);
                self.open.insert(key, kept);
            }
        }
        self
    }

    /// Entries that never found an exit.
    pub fn open_positions(&self) -> usize {
        self.open.len()
    }

    /// Closed round trips, the last one closed first.
    pub fn into_trades_newest_first(self) -> Vec<Trade> {
        let mut trades = self.closed;
        trades.reverse();
        trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(time: &str, side: TradeSide, price: f64, size: f64) -> Fill {
        Fill {
            time: time.to_string(),
            side,
            price,
            size,
        }
    }

    fn no_duration(_: &Fill, _: &Fill) -> u64 {
        0
    }

    const ENTRY_SIZED: PairingRules = PairingRules {
        closing_size: ClosingSize::Entry,
        duration: no_duration,
    };

    #[test]
    fn pnl_sign_follows_direction() {
        assert_eq!(realized_pnl(TradeSide::Buy, 100.0, 110.0, 5.0), 50.0);
        assert_eq!(realized_pnl(TradeSide::Sell, 100.0, 110.0, 5.0), -50.0);
        assert_eq!(realized_pnl(TradeSide::Sell, 110.0, 100.0, 2.0), 20.0);
    }

    #[test]
    fn opposite_fill_closes_position() {
        let trades = [
            fill("t1", TradeSide::Buy, 100.0, 5.0),
            fill("t2", TradeSide::Sell, 110.0, 5.0),
        ]
        .into_iter()
        .fold(PositionBook::new(ENTRY_SIZED), |book, f| book.apply("AAPL", f))
        .into_trades_newest_first();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].pnl, 50.0);
        assert_eq!(trades[0].entry_time, "t1");
        assert_eq!(trades[0].exit_time, "t2");
        assert_eq!(trades[0].exit_type, TradeSide::Sell);
    }

    #[test]
    fn same_side_fill_leaves_entry_untouched() {
        let book = [
            fill("t1", TradeSide::Buy, 100.0, 1.0),
            fill("t2", TradeSide::Buy, 90.0, 3.0),
            fill("t3", TradeSide::Sell, 120.0, 1.0),
        ]
        .into_iter()
        .fold(PositionBook::new(ENTRY_SIZED), |book, f| book.apply((), f));
        assert_eq!(book.open_positions(), 0);

        let trades = book.into_trades_newest_first();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].entry_price, 100.0);
        assert_eq!(trades[0].size, 1.0);
        assert_eq!(trades[0].pnl, 20.0);
    }

    #[test]
    fn positions_are_tracked_per_key() {
        let book = [
            ("A", fill("t1", TradeSide::Buy, 10.0, 1.0)),
            ("B", fill("t2", TradeSide::Sell, 20.0, 1.0)),
            ("A", fill("t3", TradeSide::Sell, 11.0, 1.0)),
        ]
        .into_iter()
        .fold(PositionBook::new(ENTRY_SIZED), |book, (k, f)| book.apply(k, f));

        assert_eq!(book.open_positions(), 1);
        assert_eq!(book.into_trades_newest_first()[0].pnl, 1.0);
    }

    #[test]
    fn closing_size_can_come_from_exit() {
        let rules = PairingRules {
            closing_size: ClosingSize::Exit,
            duration: no_duration,
        };
        let trades = [
            fill("t1", TradeSide::Sell, 50.0, 1.0),
            fill("t2", TradeSide::Buy, 40.0, 3.0),
        ]
        .into_iter()
        .fold(PositionBook::new(rules), |book, f| book.apply((), f))
        .into_trades_newest_first();

        assert_eq!(trades[0].size, 3.0);
        assert_eq!(trades[0].pnl, 30.0);
    }

    #[test]
    fn newest_closed_trade_comes_first() {
        let trades = [
            fill("t1", TradeSide::Buy, 1.0, 1.0),
            fill("t2", TradeSide::Sell, 2.0, 1.0),
            fill("t3", TradeSide::Buy, 1.0, 1.0),
            fill("t4", TradeSide::Sell, 3.0, 1.0),
        ]
        .into_iter()
        .fold(PositionBook::new(ENTRY_SIZED), |book, f| book.apply((), f))
        .into_trades_newest_first();

        assert_eq!(trades[0].exit_time, "t4");
        assert_eq!(trades[1].exit_time, "t2");
    }
}
