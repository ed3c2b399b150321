//! Portfolio-wide statistics for one strategy run.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::symbol_stats::SymbolStat;
use super::trade::FinalizedTrade;
use crate::ports::risk_port::RiskMetricsPort;

/// Profit factor reported when there are winning trades but no losing ones.
pub const PROFIT_FACTOR_NO_LOSSES: f64 = 999.0;

/// Placeholder for best/worst symbol when there are no symbols.
pub const NO_SYMBOL: &str = "N/A";

/// Risk figures supplied by an external provider. Absent values are 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub max_drawdown_pct: f64,
    pub max_drawdown_money: f64,
    pub sharpe_ratio: f64,
}

impl RiskMetrics {
    /// Queries a provider. Missing or failing metrics fall back to 0; a
    /// failure is logged and never aborts the report.
    pub fn collect(provider: &dyn RiskMetricsPort) -> Self {
        let mut metrics = RiskMetrics::default();

        match provider.drawdown() {
            Ok(Some(dd)) => {
                metrics.max_drawdown_pct = dd.max_drawdown_pct;
                metrics.max_drawdown_money = dd.max_moneydown;
            }
            Ok(None) => {}
            Err(e) => warn!(provider = provider.name(), error = %e, "drawdown unavailable"),
        }

        match provider.sharpe() {
            Ok(Some(s)) => metrics.sharpe_ratio = s.sharpe_ratio,
            Ok(None) => {}
            Err(e) => warn!(provider = provider.name(), error = %e, "sharpe ratio unavailable"),
        }

        metrics
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStat {
    pub strategy_id: String,
    pub total_pnl: f64,
    pub total_trades: usize,
    /// Percentage of trades with positive net PnL.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub max_drawdown_pct: f64,
    pub max_drawdown_money: f64,
    pub sharpe_ratio: f64,
    pub best_symbol: String,
    pub worst_symbol: String,
}

/// Gross wins over gross losses, with the 999 sentinel when nothing was lost.
pub fn profit_factor(trades: &[FinalizedTrade]) -> f64 {
    let gross_wins: f64 = trades.iter().filter(|t| t.is_win()).map(|t| t.pnl_net).sum();
    let gross_losses: f64 = trades
        .iter()
        .filter(|t| t.is_loss())
        .map(|t| t.pnl_net.abs())
        .sum();

    if gross_losses > 0.0 {
        gross_wins / gross_losses
    } else if gross_wins > 0.0 {
        PROFIT_FACTOR_NO_LOSSES
    } else {
        0.0
    }
}

pub struct StrategyAggregator;

impl StrategyAggregator {
    pub fn aggregate(
        strategy_id: &str,
        trades: &[FinalizedTrade],
        symbol_stats: &[SymbolStat],
        risk: Option<&RiskMetrics>,
    ) -> StrategyStat {
        let total_trades = trades.len();
        let total_pnl: f64 = trades.iter().map(|t| t.pnl_net).sum();
        let wins = trades.iter().filter(|t| t.is_win()).count();
        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        // Stable ascending sort: ties keep first-encountered order.
        let mut ranked: Vec<&SymbolStat> = symbol_stats.iter().collect();
        ranked.sort_by(|a, b| a.net_profit.total_cmp(&b.net_profit));
        let worst_symbol = ranked
            .first()
            .map(|s| s.symbol.clone())
            .unwrap_or_else(|| NO_SYMBOL.to_string());
        let best_symbol = ranked
            .last()
            .map(|s| s.symbol.clone())
            .unwrap_or_else(|| NO_SYMBOL.to_string());

        let risk = risk.copied().unwrap_or_default();

        StrategyStat {
            strategy_id: strategy_id.to_string(),
            total_pnl,
            total_trades,
            win_rate,
            profit_factor: profit_factor(trades),
            max_drawdown_pct: risk.max_drawdown_pct,
            max_drawdown_money: risk.max_drawdown_money,
            sharpe_ratio: risk.sharpe_ratio,
            best_symbol,
            worst_symbol,
        }
    }
}
