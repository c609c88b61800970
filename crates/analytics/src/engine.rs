use crate::report::{EquityPoint, PerformanceReport};
use core_types::Trade;

/// A stateless calculator for deriving performance metrics from a trade sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {}

struct Profitability {
    total_wins: usize,
    total_losses: usize,
    win_rate: f64,
    avg_win: f64,
    avg_loss: f64,
    profit_factor: f64,
    largest_win: f64,
    largest_loss: f64,
}

struct Streaks {
    max_win: usize,
    max_loss: usize,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `trades` - The trade sequence, in the order the metrics should walk it.
    ///
    /// # Returns
    ///
    /// `None` for an empty sequence: there are no statistics to report, which
    /// is different from a report full of zeros.
    pub fn calculate(&self, trades: &[Trade]) -> Option<PerformanceReport> {
        if trades.is_empty() {
            return None;
        }

        let profitability = self.calculate_profitability(trades);
        let equity_curve = self.calculate_equity_curve(trades);
        let streaks = self.calculate_streaks(trades);
        let avg_duration = self.calculate_avg_duration(trades);

        // Summed in the same order as the curve, so the two always agree.
        let total_pnl = equity_curve.last().map_or(0.0, |point| point.pnl);

        Some(PerformanceReport {
            total_trades: trades.len(),
            total_wins: profitability.total_wins,
            total_losses: profitability.total_losses,
            win_rate: profitability.win_rate,
            total_pnl,
            avg_win: profitability.avg_win,
            avg_loss: profitability.avg_loss,
            profit_factor: profitability.profit_factor,
            largest_win: profitability.largest_win,
            largest_loss: profitability.largest_loss,
            avg_duration,
            equity_curve,
            max_win_streak: streaks.max_win,
            max_loss_streak: streaks.max_loss,
        })
    }

    /// Calculates the win/loss split and the per-subset averages and extremes.
    fn calculate_profitability(&self, trades: &[Trade]) -> Profitability {
        let wins: Vec<f64> = trades.iter().filter(|t| t.is_win()).map(|t| t.pnl).collect();
        let losses: Vec<f64> = trades.iter().filter(|t| t.is_loss()).map(|t| t.pnl).collect();

        let avg_win = mean(&wins);
        let avg_loss = mean(&losses);

        let profit_factor = if avg_loss != 0.0 {
            (avg_win / avg_loss).abs()
        } else {
            0.0
        };

        let largest_win = if wins.is_empty() {
            0.0
        } else {
            wins.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        };
        let largest_loss = if losses.is_empty() {
            0.0
        } else {
            losses.iter().copied().fold(f64::INFINITY, f64::min)
        };

        Profitability {
            total_wins: wins.len(),
            total_losses: losses.len(),
            win_rate: 100.0 * wins.len() as f64 / trades.len() as f64,
            avg_win,
            avg_loss,
            profit_factor,
            largest_win,
            largest_loss,
        }
    }

    /// Cumulative P&L after each trade, in sequence order.
    fn calculate_equity_curve(&self, trades: &[Trade]) -> Vec<EquityPoint> {
        trades
            .iter()
            .enumerate()
            .scan(0.0_f64, |cumulative, (i, trade)| {
                *cumulative += trade.pnl;
                Some(EquityPoint {
                    trade: i + 1,
                    pnl: *cumulative,
                })
            })
            .collect()
    }

    /// Longest runs of winners and of non-winners, walking the trades in the given order.
    ///
    /// Anything that is not a strict win (scratches and NaN included) extends a losing run.
    fn calculate_streaks(&self, trades: &[Trade]) -> Streaks {
        let mut streaks = Streaks {
            max_win: 0,
            max_loss: 0,
        };
        let mut current = 0;
        let mut on_win_run: Option<bool> = None;

        for trade in trades {
            let won = trade.is_win();
            current = if on_win_run == Some(won) { current + 1 } else { 1 };
            on_win_run = Some(won);

            if won {
                streaks.max_win = streaks.max_win.max(current);
            } else {
                streaks.max_loss = streaks.max_loss.max(current);
            }
        }

        streaks
    }

    fn calculate_avg_duration(&self, trades: &[Trade]) -> f64 {
        let total: f64 = trades.iter().map(|t| t.duration_ms as f64).sum();
        total / trades.len() as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Leg, TradeSide};

    fn trade(pnl: f64) -> Trade {
        trade_with_duration(pnl, 0)
    }

    fn trade_with_duration(pnl: f64, duration_ms: u64) -> Trade {
        Trade::round_trip(
            TradeSide::Buy,
            Leg::new("2024-01-02 09:30:00", 100.0),
            Leg::new("2024-01-02 10:00:00", 100.0 + pnl),
            1.0,
            pnl,
            duration_ms,
        )
    }

    fn report(pnls: &[f64]) -> PerformanceReport {
        let trades: Vec<Trade> = pnls.iter().copied().map(trade).collect();
        AnalyticsEngine::new().calculate(&trades).unwrap()
    }

    #[test]
    fn empty_sequence_has_no_statistics() {
        assert!(AnalyticsEngine::new().calculate(&[]).is_none());
    }

    #[test]
    fn mixed_sequence() {
        let r = report(&[100.0, -50.0, 200.0, -25.0, 0.0]);

        assert_eq!(r.total_trades, 5);
        assert_eq!(r.total_wins, 2);
        assert_eq!(r.total_losses, 2);
        assert_eq!(r.win_rate, 40.0);
        assert_eq!(r.total_pnl, 225.0);
        assert_eq!(r.avg_win, 150.0);
        assert_eq!(r.avg_loss, -37.5);
        assert_eq!(r.profit_factor, 4.0);
        assert_eq!(r.largest_win, 200.0);
        assert_eq!(r.largest_loss, -50.0);
    }

    #[test]
    fn equity_curve_is_one_based_and_cumulative() {
        let r = report(&[10.0, -4.0, 6.0]);
        let curve: Vec<(usize, f64)> = r.equity_curve.iter().map(|p| (p.trade, p.pnl)).collect();
        assert_eq!(curve, vec![(1, 10.0), (2, 6.0), (3, 12.0)]);
        assert_eq!(r.final_equity(), Some(r.total_pnl));
    }

    #[test]
    fn profit_factor_is_zero_without_losses() {
        let r = report(&[10.0, 20.0]);
        assert_eq!(r.avg_loss, 0.0);
        assert_eq!(r.profit_factor, 0.0);
        assert_eq!(r.largest_loss, 0.0);
        assert_eq!(r.win_rate, 100.0);
    }

    #[test]
    fn all_losses() {
        let r = report(&[-10.0, -30.0]);
        assert_eq!(r.total_wins, 0);
        assert_eq!(r.avg_win, 0.0);
        assert_eq!(r.largest_win, 0.0);
        assert_eq!(r.profit_factor, 0.0);
        assert_eq!(r.largest_loss, -30.0);
        assert_eq!(r.max_loss_streak, 2);
    }

    #[test]
    fn single_trade() {
        let r = report(&[42.0]);
        assert_eq!(r.total_trades, 1);
        assert_eq!(r.win_rate, 100.0);
        assert_eq!(r.max_win_streak, 1);
        assert_eq!(r.max_loss_streak, 0);
        assert_eq!(r.equity_curve.len(), 1);
    }

    #[test]
    fn streaks_follow_sequence_order() {
        let r = report(&[1.0, 1.0, -1.0, 1.0, 1.0, 1.0, -1.0, -1.0]);
        assert_eq!(r.max_win_streak, 3);
        assert_eq!(r.max_loss_streak, 2);
    }

    #[test]
    fn scratch_extends_losing_streak_but_not_loss_count() {
        let r = report(&[-5.0, 0.0, 0.0, 3.0]);
        assert_eq!(r.max_loss_streak, 3);
        assert_eq!(r.total_losses, 1);
        assert_eq!(r.avg_loss, -5.0);
        assert_eq!(r.largest_loss, -5.0);
        assert_eq!(r.win_rate, 25.0);
    }

    #[test]
    fn nan_pnl_propagates_into_totals() {
        let r = report(&[10.0, f64::NAN, -5.0]);
        assert!(r.total_pnl.is_nan());
        assert!(r.final_equity().unwrap().is_nan());
        // NaN is neither a win nor a loss, so the subset metrics stay finite.
        assert_eq!(r.total_wins, 1);
        assert_eq!(r.total_losses, 1);
        assert_eq!(r.avg_win, 10.0);
        assert_eq!(r.max_loss_streak, 2);
    }

    #[test]
    fn average_duration_covers_all_trades() {
        let trades = vec![
            trade_with_duration(1.0, 60_000),
            trade_with_duration(-1.0, 0),
            trade_with_duration(0.0, 30_000),
        ];
        let r = AnalyticsEngine::new().calculate(&trades).unwrap();
        assert_eq!(r.avg_duration, 30_000.0);
    }

    #[test]
    fn win_rate_scales_before_dividing() {
        // 14 of 27: dividing first lands one ulp below 100 * 14 / 27.
        let pnls: Vec<f64> = (0..27).map(|i| if i < 14 { 1.0 } else { -1.0 }).collect();
        let stats = report(&pnls);
        assert_eq!(stats.total_wins, 14);
        assert_eq!(stats.win_rate, 100.0 * 14.0 / 27.0);
        assert_eq!(stats.win_rate, 51.851851851851855);
    }

    #[test]
    fn calculation_is_repeatable() {
        let trades: Vec<Trade> = [0.1, 0.2, -0.3, 0.7].into_iter().map(trade).collect();
        let engine = AnalyticsEngine::new();
        let first = engine.calculate(&trades).unwrap();
        let second = engine.calculate(&trades).unwrap();
        assert_eq!(first.total_pnl.to_bits(), second.total_pnl.to_bits());
        assert_eq!(first, second);
    }
}
