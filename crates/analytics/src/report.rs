use serde::{Deserialize, Serialize};

/// Cumulative P&L after a given trade. `trade` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub trade: usize,
    pub pnl: f64,
}

/// A standardized report of trading performance over a sequence of trades.
///
/// This struct is the output of the `AnalyticsEngine` and is rebuilt from
/// scratch whenever its input sequence changes. It is only ever produced for
/// a non-empty sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    // I. Counts
    pub total_trades: usize,
    /// Trades with strictly positive P&L.
    pub total_wins: usize,
    /// Trades with strictly negative P&L. Scratches count in neither bucket.
    pub total_losses: usize,
    /// `total_wins / total_trades * 100`.
    pub win_rate: f64,

    // II. Profitability
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    pub avg_win: f64,
    /// Mean of the losing trades; negative or zero.
    pub avg_loss: f64,
    /// `|avg_win / avg_loss|`, zero when there is no average loss.
    pub profit_factor: f64,
    pub largest_win: f64,
    /// Most negative losing trade.
    pub largest_loss: f64,

    // III. Time
    /// Mean holding time in milliseconds across all trades.
    pub avg_duration: f64,

    // IV. Sequence metrics
    pub equity_curve: Vec<EquityPoint>,
    pub max_win_streak: usize,
    /// Longest run of trades with P&L that is not strictly positive.
    pub max_loss_streak: usize,
}

impl PerformanceReport {
    /// Final cumulative P&L of the equity curve.
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().map(|point| point.pnl)
    }
}
