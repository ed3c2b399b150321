//! CSV report adapter implementing ReportPort.
//!
//! Files written under the output directory:
//! `trade_log_{strategy}.csv`, `symbol_report_{strategy}.csv`,
//! `strategy_summary_{strategy}.csv` and `summary_{strategy}.csv` (the
//! flattened report as a single row).

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::file_stem;
use crate::domain::error::TradelogError;
use crate::domain::report::Report;
use crate::domain::strategy_stats::StrategyStat;
use crate::domain::symbol_stats::SymbolStat;
use crate::domain::trade::FinalizedTrade;
use crate::ports::report_port::ReportPort;

/// Header row of a record type, written even when there are no rows.
trait Columns {
    const COLUMNS: &'static [&'static str];
}

impl Columns for FinalizedTrade {
    const COLUMNS: &'static [&'static str] = &[
        "ticket_id",
        "strategy_name",
        "symbol",
        "side",
        "entry_time",
        "exit_time",
        "entry_price",
        "exit_price",
        "size",
        "pnl_gross",
        "commission",
        "pnl_net",
        "pnl_pct",
        "cumulative_pnl",
        "duration_days",
        "bar_len",
        "entry_notional",
        "notional_fraction_of_equity",
    ];
}

impl Columns for SymbolStat {
    const COLUMNS: &'static [&'static str] = &[
        "strategy_name",
        "symbol",
        "total_trades",
        "net_profit",
        "win_rate",
        "avg_trade_pnl",
        "best_trade",
        "worst_trade",
    ];
}

impl Columns for StrategyStat {
    const COLUMNS: &'static [&'static str] = &[
        "strategy_id",
        "total_pnl",
        "total_trades",
        "win_rate",
        "profit_factor",
        "max_drawdown_pct",
        "max_drawdown_money",
        "sharpe_ratio",
        "best_symbol",
        "worst_symbol",
    ];
}

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn target(&self, prefix: &str, strategy_name: &str) -> Result<PathBuf, TradelogError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            TradelogError::export(self.output_dir.display().to_string(), e.to_string())
        })?;
        Ok(self
            .output_dir
            .join(format!("{}_{}.csv", prefix, file_stem(strategy_name))))
    }

    fn write_rows<T: Serialize + Columns>(path: &Path, rows: &[T]) -> Result<(), TradelogError> {
        let export_err = |e: csv::Error| TradelogError::export(path.display().to_string(), e.to_string());
        let mut writer = csv::Writer::from_path(path).map_err(export_err)?;
        if rows.is_empty() {
            writer.write_record(T::COLUMNS).map_err(export_err)?;
        }
        for row in rows {
            writer.serialize(row).map_err(export_err)?;
        }
        writer
            .flush()
            .map_err(|e| TradelogError::export(path.display().to_string(), e.to_string()))
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_trade_log(
        &self,
        strategy_name: &str,
        trades: &[FinalizedTrade],
    ) -> Result<PathBuf, TradelogError> {
        let path = self.target("trade_log", strategy_name)?;
        Self::write_rows(&path, trades)?;
        Ok(path)
    }

    fn write_symbol_stats(
        &self,
        strategy_name: &str,
        stats: &[SymbolStat],
    ) -> Result<PathBuf, TradelogError> {
        let path = self.target("symbol_report", strategy_name)?;
        Self::write_rows(&path, stats)?;
        Ok(path)
    }

    fn write_strategy_stat(&self, stat: &StrategyStat) -> Result<PathBuf, TradelogError> {
        let path = self.target("strategy_summary", &stat.strategy_id)?;
        Self::write_rows(&path, std::slice::from_ref(stat))?;
        Ok(path)
    }

    fn write_report(&self, report: &Report) -> Result<PathBuf, TradelogError> {
        let path = self.target("summary", &report.meta.strategy_name)?;
        let row = report.flatten();
        let export_err = |e: csv::Error| TradelogError::export(path.display().to_string(), e.to_string());

        let mut writer = csv::Writer::from_path(&path).map_err(export_err)?;
        writer.write_record(row.keys()).map_err(export_err)?;
        writer.write_record(row.values()).map_err(export_err)?;
        writer
            .flush()
            .map_err(|e| TradelogError::export(path.display().to_string(), e.to_string()))?;
        Ok(path)
    }
}
