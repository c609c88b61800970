use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a single fill, or of the opening leg of a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Returns the opposite side of the fill
    pub fn opposite(&self) -> Self {
        match self {
            TradeSide::Buy => TradeSide::Sell,
            TradeSide::Sell => TradeSide::Buy,
        }
    }

    /// Parses a side label as written in broker exports (`BUY`, `sell`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(TradeSide::Buy),
            "SELL" => Some(TradeSide::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// The export formats the importers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum PlatformFormat {
    /// Performance export with one pre-paired round trip per row.
    Tradovate,
    /// Account statement with an "Account Trade History" section of raw executions.
    #[cfg_attr(feature = "clap", value(name = "thinkorswim"))]
    #[serde(rename = "thinkorswim")]
    ThinkOrSwim,
    /// Strategy/paper-trading log of `Time,Text` narrative messages.
    #[cfg_attr(feature = "clap", value(name = "tradingview"))]
    #[serde(rename = "tradingview")]
    TradingView,
}

impl PlatformFormat {
    pub const ALL: [PlatformFormat; 3] = [
        PlatformFormat::Tradovate,
        PlatformFormat::ThinkOrSwim,
        PlatformFormat::TradingView,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            PlatformFormat::Tradovate => "tradovate",
            PlatformFormat::ThinkOrSwim => "thinkorswim",
            PlatformFormat::TradingView => "tradingview",
        }
    }

    /// Human readable platform name, used in prompts and report headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformFormat::Tradovate => "Tradovate",
            PlatformFormat::ThinkOrSwim => "ThinkOrSwim",
            PlatformFormat::TradingView => "TradingView",
        }
    }
}

impl fmt::Display for PlatformFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PlatformFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PlatformFormat::ALL
            .into_iter()
            .find(|format| format.tag() == wanted)
            .ok_or_else(|| CoreError::InvalidInput("format".to_string(), s.to_string()))
    }
}

/// Calendar granularity used to bucket trades by exit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Day, Period::Week, Period::Month];

    pub fn tag(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|period| period.tag() == wanted)
            .ok_or_else(|| CoreError::InvalidInput("period".to_string(), s.to_string()))
    }
}

/// What the consumer wants to look at: the whole dataset or one period slicing of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Day,
    Week,
    Month,
}

impl ViewMode {
    /// The grouping period behind this view, `None` for the all-time view.
    pub fn period(&self) -> Option<Period> {
        match self {
            ViewMode::All => None,
            ViewMode::Day => Some(Period::Day),
            ViewMode::Week => Some(Period::Week),
            ViewMode::Month => Some(Period::Month),
        }
    }
}
