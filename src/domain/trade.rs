//! Finalized trade records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trade, derived from the sign of its largest size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Positive sizes are long; zero and negative sizes are short.
    pub fn from_size(size: f64) -> Self {
        if size > 0.0 { Side::Long } else { Side::Short }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("Long"),
            Side::Short => f.write_str("Short"),
        }
    }
}

/// One completed trade. Field names are part of the export contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedTrade {
    pub ticket_id: u64,
    pub strategy_name: String,
    pub symbol: String,
    pub side: Side,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Largest-magnitude size seen for the session, signed: negative for shorts.
    pub size: f64,
    pub pnl_gross: f64,
    pub commission: f64,
    pub pnl_net: f64,
    pub pnl_pct: f64,
    pub cumulative_pnl: f64,
    pub duration_days: f64,
    pub bar_len: Option<u64>,
    pub entry_notional: f64,
    pub notional_fraction_of_equity: f64,
}

impl FinalizedTrade {
    pub fn is_win(&self) -> bool {
        self.pnl_net > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl_net < 0.0
    }
}

/// `|price × size|`.
pub fn entry_notional(price: f64, size: f64) -> f64 {
    (price * size).abs()
}

/// PnL as a percentage of entry notional, 0 when the notional is not positive.
pub fn pnl_pct(pnl_net: f64, notional: f64) -> f64 {
    if notional > 0.0 {
        pnl_net / notional * 100.0
    } else {
        0.0
    }
}

/// Share of equity committed at entry, 0 when equity is 0.
pub fn fraction_of_equity(notional: f64, equity: f64) -> f64 {
    if equity != 0.0 { notional / equity } else { 0.0 }
}

/// Holding period in fractional days.
pub fn duration_days(entry: NaiveDateTime, exit: NaiveDateTime) -> f64 {
    (exit - entry).num_milliseconds() as f64 / 86_400_000.0
}
