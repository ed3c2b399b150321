//! Append-only trade history.

use super::trade::FinalizedTrade;

/// Finalized trades in close order. History is never mutated once appended.
///
/// Each trade carries the feed position of the notification that closed it,
/// so ledgers built from separate slices of one feed can be merged back into
/// the order a single builder would have produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLedger {
    trades: Vec<FinalizedTrade>,
    close_seq: Vec<u64>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a trade closed right after the previous one.
    pub fn append(&mut self, trade: FinalizedTrade) {
        let seq = self.close_seq.last().map_or(0, |last| last + 1);
        self.append_at(seq, trade);
    }

    /// Appends a trade closed by the notification at `close_seq` in the feed.
    pub fn append_at(&mut self, close_seq: u64, trade: FinalizedTrade) {
        self.trades.push(trade);
        self.close_seq.push(close_seq);
    }

    pub fn all(&self) -> &[FinalizedTrade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Combines ledgers built independently (one per instrument) into one
    /// history. Trades are stably ordered by close sequence, ticket ids are
    /// reassigned from 1 and cumulative PnL is recomputed in the new order.
    pub fn merge(ledgers: impl IntoIterator<Item = TradeLedger>) -> Self {
        let mut entries: Vec<(u64, FinalizedTrade)> = ledgers
            .into_iter()
            .flat_map(|l| l.close_seq.into_iter().zip(l.trades))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);

        let mut merged = TradeLedger::new();
        let mut cumulative = 0.0;
        for (i, (seq, mut trade)) in entries.into_iter().enumerate() {
            cumulative += trade.pnl_net;
            trade.ticket_id = i as u64 + 1;
            trade.cumulative_pnl = cumulative;
            merged.append_at(seq, trade);
        }
        merged
    }
}

impl FromIterator<FinalizedTrade> for TradeLedger {
    fn from_iter<I: IntoIterator<Item = FinalizedTrade>>(iter: I) -> Self {
        let mut ledger = TradeLedger::new();
        for trade in iter {
            ledger.append(trade);
        }
        ledger
    }
}
