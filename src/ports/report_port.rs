//! Report output port.

use std::path::PathBuf;

use crate::domain::analyzer::AnalysisResults;
use crate::domain::error::TradelogError;
use crate::domain::report::Report;
use crate::domain::strategy_stats::StrategyStat;
use crate::domain::symbol_stats::SymbolStat;
use crate::domain::trade::FinalizedTrade;

/// Port for writing analysis output. Each method returns the path written.
pub trait ReportPort {
    fn write_trade_log(
        &self,
        strategy_name: &str,
        trades: &[FinalizedTrade],
    ) -> Result<PathBuf, TradelogError>;

    fn write_symbol_stats(
        &self,
        strategy_name: &str,
        stats: &[SymbolStat],
    ) -> Result<PathBuf, TradelogError>;

    fn write_strategy_stat(&self, stat: &StrategyStat) -> Result<PathBuf, TradelogError>;

    fn write_report(&self, report: &Report) -> Result<PathBuf, TradelogError>;

    /// Default implementation: writes every artifact of one run.
    fn write_all(
        &self,
        results: &AnalysisResults,
        report: &Report,
    ) -> Result<Vec<PathBuf>, TradelogError> {
        let strategy = results.global.strategy_id.as_str();
        Ok(vec![
            self.write_trade_log(strategy, &results.log)?,
            self.write_symbol_stats(strategy, &results.by_symbol)?,
            self.write_strategy_stat(&results.global)?,
            self.write_report(report)?,
        ])
    }
}
