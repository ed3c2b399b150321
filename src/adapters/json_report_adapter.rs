//! JSON report adapter implementing ReportPort. Keeps the nested report
//! structure; field order follows the record definitions.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::adapters::file_stem;
use crate::domain::error::TradelogError;
use crate::domain::report::Report;
use crate::domain::strategy_stats::StrategyStat;
use crate::domain::symbol_stats::SymbolStat;
use crate::domain::trade::FinalizedTrade;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter {
    output_dir: PathBuf,
}

impl JsonReportAdapter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        prefix: &str,
        strategy_name: &str,
        value: &T,
    ) -> Result<PathBuf, TradelogError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            TradelogError::export(self.output_dir.display().to_string(), e.to_string())
        })?;
        let path = self
            .output_dir
            .join(format!("{}_{}.json", prefix, file_stem(strategy_name)));

        let file = File::create(&path)
            .map_err(|e| TradelogError::export(path.display().to_string(), e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)
            .map_err(|e| TradelogError::export(path.display().to_string(), e.to_string()))?;
        writer
            .flush()
            .map_err(|e| TradelogError::export(path.display().to_string(), e.to_string()))?;
        Ok(path)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write_trade_log(
        &self,
        strategy_name: &str,
        trades: &[FinalizedTrade],
    ) -> Result<PathBuf, TradelogError> {
        self.write_json("trade_log", strategy_name, trades)
    }

    fn write_symbol_stats(
        &self,
        strategy_name: &str,
        stats: &[SymbolStat],
    ) -> Result<PathBuf, TradelogError> {
        self.write_json("symbol_report", strategy_name, stats)
    }

    fn write_strategy_stat(&self, stat: &StrategyStat) -> Result<PathBuf, TradelogError> {
        self.write_json("strategy_summary", &stat.strategy_id, stat)
    }

    fn write_report(&self, report: &Report) -> Result<PathBuf, TradelogError> {
        self.write_json("report", &report.meta.strategy_name, report)
    }
}
