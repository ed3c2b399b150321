//! Trade-log analyzer: one builder and ledger per strategy run, producing
//! the trade log, per-symbol stats and the strategy summary together.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::builder::TradeRecordBuilder;
use super::error::TradelogError;
use super::ledger::TradeLedger;
use super::notification::TradeNotification;
use super::strategy_stats::{RiskMetrics, StrategyAggregator, StrategyStat};
use super::symbol_stats::{SymbolAggregator, SymbolStat};
use super::trade::FinalizedTrade;

/// The three result layers of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResults {
    pub log: Vec<FinalizedTrade>,
    pub by_symbol: Vec<SymbolStat>,
    pub global: StrategyStat,
}

pub struct TradeLogAnalyzer {
    builder: TradeRecordBuilder,
    ledger: TradeLedger,
    next_seq: u64,
    synthesized: usize,
    discarded: usize,
}

/// A notification tagged with its position in the full feed.
pub type SequencedNotification = (u64, TradeNotification);

impl TradeLogAnalyzer {
    pub fn new(strategy_name: impl Into<String>) -> Self {
        TradeLogAnalyzer {
            builder: TradeRecordBuilder::new(strategy_name),
            ledger: TradeLedger::new(),
            next_seq: 0,
            synthesized: 0,
            discarded: 0,
        }
    }

    pub fn strategy_name(&self) -> &str {
        self.builder.strategy_name()
    }

    /// Feeds the next notification of the feed.
    pub fn on_notification(&mut self, n: &TradeNotification) -> Result<(), TradelogError> {
        self.on_sequenced(self.next_seq, n)
    }

    /// Feeds a notification whose feed position is already known.
    pub fn on_sequenced(&mut self, seq: u64, n: &TradeNotification) -> Result<(), TradelogError> {
        if let Some(trade) = self.builder.on_notification(n)? {
            self.ledger.append_at(seq, trade);
        }
        self.next_seq = seq + 1;
        Ok(())
    }

    pub fn ingest<'a>(
        &mut self,
        notifications: impl IntoIterator<Item = &'a TradeNotification>,
    ) -> Result<(), TradelogError> {
        for n in notifications {
            self.on_notification(n)?;
        }
        Ok(())
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    pub fn open_sessions(&self) -> usize {
        self.builder.open_sessions()
    }

    /// Closes that arrived without a recorded open, across every builder
    /// that fed this ledger.
    pub fn synthesized_count(&self) -> usize {
        self.synthesized + self.builder.synthesized_count()
    }

    /// Open sessions dropped by [`finish`](Self::finish).
    pub fn discarded_count(&self) -> usize {
        self.discarded
    }

    /// Ends the run: in-flight sessions are dropped and never finalized.
    /// Returns how many were dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.builder.discard_open();
        if dropped > 0 {
            info!(
                strategy = self.builder.strategy_name(),
                dropped, "unclosed trades left out of the log"
            );
        }
        self.discarded += dropped;
        dropped
    }

    /// Computes the trade log, per-symbol stats and strategy summary from
    /// the current ledger. Can be called any number of times.
    pub fn results(&self, risk: Option<&RiskMetrics>) -> AnalysisResults {
        let name = self.builder.strategy_name();
        let trades = self.ledger.all();
        let by_symbol = SymbolAggregator::aggregate(name, trades);
        let global = StrategyAggregator::aggregate(name, trades, &by_symbol, risk);
        AnalysisResults {
            log: trades.to_vec(),
            by_symbol,
            global,
        }
    }

    /// Runs one independent builder per stream on the rayon pool and merges
    /// the resulting ledgers back into feed close order. Every stream is
    /// finished, so open sessions left in any of them are discarded.
    pub fn analyze_parallel(
        strategy_name: &str,
        streams: Vec<Vec<SequencedNotification>>,
    ) -> Result<Self, TradelogError> {
        let runs = streams
            .par_iter()
            .map(|stream| {
                let mut analyzer = TradeLogAnalyzer::new(strategy_name);
                for (seq, n) in stream {
                    analyzer.on_sequenced(*seq, n)?;
                }
                analyzer.finish();
                Ok(analyzer)
            })
            .collect::<Result<Vec<_>, TradelogError>>()?;

        debug!(streams = runs.len(), "merging per-instrument ledgers");
        let mut merged = TradeLogAnalyzer::new(strategy_name);
        merged.synthesized = runs.iter().map(|r| r.synthesized_count()).sum();
        merged.discarded = runs.iter().map(|r| r.discarded).sum();
        merged.next_seq = runs.iter().map(|r| r.next_seq).max().unwrap_or(0);
        merged.ledger = TradeLedger::merge(runs.into_iter().map(|r| r.ledger));
        Ok(merged)
    }
}

/// Splits notifications into one stream per instrument. Each notification
/// keeps its position in the full feed so the streams can be merged back.
pub fn split_by_instrument(
    notifications: Vec<TradeNotification>,
) -> Vec<Vec<SequencedNotification>> {
    let mut streams: IndexMap<String, Vec<SequencedNotification>> = IndexMap::new();
    for (seq, n) in (0u64..).zip(notifications) {
        streams.entry(n.instrument.clone()).or_default().push((seq, n));
    }
    streams.into_values().collect()
}
