//! Reconstructs complete trades from streaming lifecycle notifications.
//!
//! The engine resets a trade's size to 0 once it closes, so the size seen at
//! close time cannot tell long from short. The builder remembers the
//! largest-magnitude size observed for every session and derives side, size
//! and entry notional from that memory.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::error::TradelogError;
use super::notification::{SessionId, TradeNotification};
use super::trade::{
    FinalizedTrade, Side, duration_days, entry_notional, fraction_of_equity, pnl_pct,
};

/// State of a trade between its open and close notifications.
#[derive(Debug, Clone, PartialEq)]
struct OpenTradeState {
    instrument: String,
    entry_time: NaiveDateTime,
    entry_price: f64,
    size: f64,
    equity_at_entry: f64,
    entry_notional: f64,
    notional_fraction_of_equity: f64,
    entry_bar: Option<u64>,
}

impl OpenTradeState {
    fn from_notification(n: &TradeNotification, entry_time: NaiveDateTime) -> Self {
        let notional = entry_notional(n.price, n.size);
        OpenTradeState {
            instrument: n.instrument.clone(),
            entry_time,
            entry_price: n.price,
            size: n.size,
            equity_at_entry: n.equity,
            entry_notional: notional,
            notional_fraction_of_equity: fraction_of_equity(notional, n.equity),
            entry_bar: n.bar,
        }
    }
}

pub struct TradeRecordBuilder {
    strategy_name: String,
    open: HashMap<SessionId, OpenTradeState>,
    max_sizes: HashMap<SessionId, f64>,
    next_ticket: u64,
    cumulative_pnl: f64,
    synthesized: usize,
}

impl TradeRecordBuilder {
    pub fn new(strategy_name: impl Into<String>) -> Self {
        TradeRecordBuilder {
            strategy_name: strategy_name.into(),
            open: HashMap::new(),
            max_sizes: HashMap::new(),
            next_ticket: 1,
            cumulative_pnl: 0.0,
            synthesized: 0,
        }
    }

    pub fn strategy_name(&self) -> &str {
        &self.strategy_name
    }

    /// Feeds one notification. Returns the finalized trade when the
    /// notification closes a session, `None` otherwise.
    pub fn on_notification(
        &mut self,
        n: &TradeNotification,
    ) -> Result<Option<FinalizedTrade>, TradelogError> {
        n.validate()?;
        let timestamp = n.timestamp.normalize().ok_or_else(|| {
            TradelogError::malformed(n.session_id.to_string(), "unrepresentable timestamp")
        })?;

        self.track_size(&n.session_id, n.size);

        if n.is_open && !self.open.contains_key(&n.session_id) {
            let state = OpenTradeState::from_notification(n, timestamp);
            debug!(
                session = %n.session_id,
                instrument = %n.instrument,
                price = n.price,
                size = n.size,
                "trade opened"
            );
            self.open.insert(n.session_id.clone(), state);
        }

        if !n.is_close {
            return Ok(None);
        }

        Ok(Some(self.finalize(n, timestamp)))
    }

    fn track_size(&mut self, session: &SessionId, size: f64) {
        match self.max_sizes.get_mut(session) {
            Some(max) if size.abs() > max.abs() => *max = size,
            Some(_) => {}
            None => {
                self.max_sizes.insert(session.clone(), size);
            }
        }
    }

    fn finalize(&mut self, n: &TradeNotification, exit_time: NaiveDateTime) -> FinalizedTrade {
        let state = match self.open.remove(&n.session_id) {
            Some(state) => state,
            None => {
                self.synthesized += 1;
                warn!(
                    session = %n.session_id,
                    instrument = %n.instrument,
                    "close without matching open; entry values approximated from close"
                );
                OpenTradeState::from_notification(n, exit_time)
            }
        };

        let size = self.max_sizes.remove(&n.session_id).unwrap_or(state.size);

        let notional = entry_notional(state.entry_price, size);
        let pnl_net = n.net_pnl();
        self.cumulative_pnl += pnl_net;

        let trade = FinalizedTrade {
            ticket_id: self.next_ticket,
            strategy_name: self.strategy_name.clone(),
            symbol: state.instrument,
            side: Side::from_size(size),
            entry_time: state.entry_time,
            exit_time,
            entry_price: state.entry_price,
            exit_price: n.price,
            size,
            pnl_gross: n.pnl_gross,
            commission: n.commission(),
            pnl_net,
            pnl_pct: pnl_pct(pnl_net, notional),
            cumulative_pnl: self.cumulative_pnl,
            duration_days: duration_days(state.entry_time, exit_time),
            bar_len: match (state.entry_bar, n.bar) {
                (Some(entry), Some(exit)) => Some(exit.saturating_sub(entry)),
                _ => None,
            },
            entry_notional: notional,
            notional_fraction_of_equity: fraction_of_equity(notional, state.equity_at_entry),
        };
        self.next_ticket += 1;

        debug!(
            ticket = trade.ticket_id,
            symbol = %trade.symbol,
            side = %trade.side,
            pnl_net = trade.pnl_net,
            "trade closed"
        );
        trade
    }

    /// Sessions opened but not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.open.len()
    }

    /// Closes that arrived without a recorded open.
    pub fn synthesized_count(&self) -> usize {
        self.synthesized
    }

    /// Drops every in-flight session. Unmatched opens never become trades.
    pub fn discard_open(&mut self) -> usize {
        let dropped = self.open.len();
        if dropped > 0 {
            debug!(dropped, "discarding unmatched open sessions");
        }
        self.open.clear();
        self.max_sizes.clear();
        dropped
    }
}
