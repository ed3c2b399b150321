//! Final report assembly and flattening.
//!
//! A report keeps four sections: run metadata, yearly performance, a
//! summary over all trades and the trade log itself. Structured exports use
//! the nested form; tabular exports use [`Report::flatten`], which prefixes
//! each section's keys (`meta_`, `performance_`, `trades_`) into one row.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::strategy_stats::profit_factor;
use super::trade::FinalizedTrade;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub strategy_name: String,
    pub data_name: Option<String>,
    pub start_datetime: Option<NaiveDateTime>,
    pub end_datetime: Option<NaiveDateTime>,
    pub bars: Option<u64>,
    pub equity_start: Option<f64>,
    pub equity_end: Option<f64>,
    pub cash_end: Option<f64>,
    /// Local time the report was produced, `YYYY-MM-DD HH:MM`.
    pub generated_at: String,
}

impl Meta {
    pub fn new(strategy_name: impl Into<String>) -> Self {
        Meta {
            strategy_name: strategy_name.into(),
            data_name: None,
            start_datetime: None,
            end_datetime: None,
            bars: None,
            equity_start: None,
            equity_end: None,
            cash_end: None,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// Calendar year to decimal return.
    pub annual_returns: BTreeMap<i32, f64>,
    pub total_return: Option<f64>,
    pub cagr: Option<f64>,
}

impl Performance {
    /// Compounds yearly returns in year order. With no years every field is
    /// empty.
    pub fn from_annual_returns(annual_returns: BTreeMap<i32, f64>) -> Self {
        if annual_returns.is_empty() {
            return Performance::default();
        }
        let factor: f64 = annual_returns.values().map(|r| 1.0 + r).product();
        let years = annual_returns.len() as f64;
        Performance {
            total_return: Some(factor - 1.0),
            cagr: Some(factor.powf(1.0 / years) - 1.0),
            annual_returns,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradesSummary {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Fraction of winning trades; absent with no trades.
    pub win_rate: Option<f64>,
    pub avg_win: Option<f64>,
    pub avg_loss: Option<f64>,
    pub pnl_net_total: f64,
    pub pnl_gross_total: f64,
    pub largest_win: f64,
    /// Most negative trade PnL, 0 without losses.
    pub largest_loss: f64,
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
    pub profit_factor: f64,
}

impl TradesSummary {
    pub fn from_trades(trades: &[FinalizedTrade]) -> Self {
        let mut summary = TradesSummary {
            total_trades: trades.len(),
            profit_factor: profit_factor(trades),
            ..TradesSummary::default()
        };

        let mut win_total = 0.0;
        let mut loss_total = 0.0;
        let (mut win_run, mut loss_run) = (0usize, 0usize);

        for trade in trades {
            summary.pnl_net_total += trade.pnl_net;
            summary.pnl_gross_total += trade.pnl_gross;

            if trade.is_win() {
                summary.wins += 1;
                win_total += trade.pnl_net;
                summary.largest_win = summary.largest_win.max(trade.pnl_net);
                win_run += 1;
                loss_run = 0;
            } else if trade.is_loss() {
                summary.losses += 1;
                loss_total += trade.pnl_net;
                summary.largest_loss = summary.largest_loss.min(trade.pnl_net);
                loss_run += 1;
                win_run = 0;
            } else {
                win_run = 0;
                loss_run = 0;
            }
            summary.max_win_streak = summary.max_win_streak.max(win_run);
            summary.max_loss_streak = summary.max_loss_streak.max(loss_run);
        }

        if summary.total_trades > 0 {
            summary.win_rate = Some(summary.wins as f64 / summary.total_trades as f64);
        }
        if summary.wins > 0 {
            summary.avg_win = Some(win_total / summary.wins as f64);
        }
        if summary.losses > 0 {
            summary.avg_loss = Some(loss_total / summary.losses as f64);
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: Meta,
    pub performance: Performance,
    pub trades_summary: TradesSummary,
    pub trade_log: Vec<FinalizedTrade>,
}

impl Report {
    pub fn assemble(
        meta: Meta,
        performance: Performance,
        trades_summary: TradesSummary,
        trade_log: Vec<FinalizedTrade>,
    ) -> Self {
        Report {
            meta,
            performance,
            trades_summary,
            trade_log,
        }
    }

    /// One ordered row of prefixed keys. Scalars are written as plain text,
    /// absent values as empty strings and nested values as compact JSON.
    /// The trade log is not part of the row.
    pub fn flatten(&self) -> IndexMap<String, String> {
        let mut row = IndexMap::new();
        push_section(&mut row, "meta", serde_json::to_value(&self.meta));
        push_section(&mut row, "performance", serde_json::to_value(&self.performance));
        push_section(&mut row, "trades", serde_json::to_value(&self.trades_summary));
        row
    }
}

fn push_section(
    row: &mut IndexMap<String, String>,
    prefix: &str,
    section: Result<Value, serde_json::Error>,
) {
    if let Ok(Value::Object(fields)) = section {
        for (key, value) in fields {
            row.insert(format!("{prefix}_{key}"), render_cell(&value));
        }
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
