//! Per-instrument statistics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::trade::FinalizedTrade;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolStat {
    pub strategy_name: String,
    pub symbol: String,
    pub total_trades: usize,
    pub net_profit: f64,
    /// Percentage of trades with positive net PnL.
    pub win_rate: f64,
    pub avg_trade_pnl: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
}

impl SymbolStat {
    fn from_group(strategy_name: &str, symbol: &str, trades: &[&FinalizedTrade]) -> Self {
        let count = trades.len();
        let net_profit: f64 = trades.iter().map(|t| t.pnl_net).sum();
        let wins = trades.iter().filter(|t| t.is_win()).count();
        let best_trade = trades
            .iter()
            .map(|t| t.pnl_net)
            .fold(f64::NEG_INFINITY, f64::max);
        let worst_trade = trades
            .iter()
            .map(|t| t.pnl_net)
            .fold(f64::INFINITY, f64::min);

        let (win_rate, avg_trade_pnl) = if count > 0 {
            (
                wins as f64 / count as f64 * 100.0,
                net_profit / count as f64,
            )
        } else {
            (0.0, 0.0)
        };

        SymbolStat {
            strategy_name: strategy_name.to_string(),
            symbol: symbol.to_string(),
            total_trades: count,
            net_profit,
            win_rate,
            avg_trade_pnl,
            best_trade: if count > 0 { best_trade } else { 0.0 },
            worst_trade: if count > 0 { worst_trade } else { 0.0 },
        }
    }
}

pub struct SymbolAggregator;

impl SymbolAggregator {
    /// Groups trades by symbol in first-encountered order and computes one
    /// stat per group. Pure: the same trades always give the same stats.
    pub fn aggregate(strategy_name: &str, trades: &[FinalizedTrade]) -> Vec<SymbolStat> {
        let mut groups: IndexMap<&str, Vec<&FinalizedTrade>> = IndexMap::new();
        for trade in trades {
            groups.entry(trade.symbol.as_str()).or_default().push(trade);
        }
        groups
            .iter()
            .map(|(symbol, group)| SymbolStat::from_group(strategy_name, symbol, group))
            .collect()
    }
}
