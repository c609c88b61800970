use crate::enums::TradeSide;
use crate::time::parse_timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One side of a round trip as reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// Timestamp exactly as it appears in the source export.
    pub time: String,
    pub price: f64,
}

impl Leg {
    pub fn new(time: impl Into<String>, price: f64) -> Self {
        Self {
            time: time.into(),
            price,
        }
    }
}

/// A completed round trip: an entry fill matched with an opposite-side exit fill.
///
/// Numeric fields are `f64` so that an unparseable source value survives as
/// NaN and poisons every aggregate it flows into instead of silently reading
/// as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub entry_time: String,
    pub entry_type: TradeSide,
    pub entry_price: f64,
    pub exit_time: String,
    pub exit_type: TradeSide,
    pub exit_price: f64,
    pub size: f64,
    /// Realized profit or loss. Positive is a win, negative a loss, zero a scratch.
    pub pnl: f64,
    /// Holding time in milliseconds, zero when the platform does not report it.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
}

impl Trade {
    /// Builds a trade from its two legs. The exit side is always the opposite of `entry_type`.
    pub fn round_trip(
        entry_type: TradeSide,
        entry: Leg,
        exit: Leg,
        size: f64,
        pnl: f64,
        duration_ms: u64,
    ) -> Self {
        Self {
            entry_time: entry.time,
            entry_type,
            entry_price: entry.price,
            exit_time: exit.time,
            exit_type: entry_type.opposite(),
            exit_price: exit.price,
            size,
            pnl,
            duration_ms,
        }
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }

    pub fn entry_instant(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.entry_time)
    }

    pub fn exit_instant(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.exit_time)
    }
}
