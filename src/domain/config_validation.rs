//! Configuration validation and loading.
//!
//! Checks every `[run]`, `[export]` and `[risk]` field before an analysis
//! runs, then turns them into an [`AnalysisConfig`].

use crate::domain::error::TradelogError;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Which report files an analysis writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    Json,
    #[default]
    Both,
}

impl ExportFormat {
    pub fn writes_csv(self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Both)
    }

    pub fn writes_json(self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::Both)
    }
}

impl FromStr for ExportFormat {
    type Err = TradelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "both" => Ok(ExportFormat::Both),
            other => Err(TradelogError::ConfigInvalid {
                section: "export".to_string(),
                key: "format".to_string(),
                reason: format!("unknown format '{other}', expected csv, json or both"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub strategy_name: Option<String>,
    pub data_name: Option<String>,
    pub initial_equity: Option<f64>,
    pub parallel: bool,
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    pub risk_free_rate: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            strategy_name: None,
            data_name: None,
            initial_equity: None,
            parallel: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: ExportFormat::default(),
            risk_free_rate: 0.0,
        }
    }
}

impl AnalysisConfig {
    /// Reads and checks every field. `strategy_name` may be absent here and
    /// supplied later on the command line.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, TradelogError> {
        validate_initial_equity(config)?;
        validate_risk_free_rate(config)?;
        validate_output_dir(config)?;

        let format = match non_empty(config, "export", "format") {
            Some(s) => s.parse()?,
            None => ExportFormat::default(),
        };

        Ok(AnalysisConfig {
            strategy_name: non_empty(config, "run", "strategy_name"),
            data_name: non_empty(config, "run", "data_name"),
            initial_equity: non_empty(config, "run", "initial_equity")
                .map(|_| config.get_double("run", "initial_equity", 0.0)),
            parallel: config.get_bool("run", "parallel", false),
            output_dir: non_empty(config, "export", "output_dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            format,
            risk_free_rate: config.get_double("risk", "risk_free_rate", 0.0),
        })
    }
}

/// Full check of a standalone config file: every field must be valid and a
/// strategy name must be present.
pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    validate_strategy_name(config)?;
    AnalysisConfig::from_port(config)?;
    Ok(())
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn validate_strategy_name(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    match non_empty(config, "run", "strategy_name") {
        Some(_) => Ok(()),
        None => Err(TradelogError::ConfigMissing {
            section: "run".to_string(),
            key: "strategy_name".to_string(),
        }),
    }
}

fn validate_initial_equity(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    let Some(raw) = non_empty(config, "run", "initial_equity") else {
        return Ok(());
    };
    match raw.parse::<f64>() {
        Ok(v) if v > 0.0 && v.is_finite() => Ok(()),
        _ => Err(TradelogError::ConfigInvalid {
            section: "run".to_string(),
            key: "initial_equity".to_string(),
            reason: "initial_equity must be a positive number".to_string(),
        }),
    }
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    let value = config.get_double("risk", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(TradelogError::ConfigInvalid {
            section: "risk".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_output_dir(config: &dyn ConfigPort) -> Result<(), TradelogError> {
    match config.get_string("export", "output_dir") {
        Some(s) if s.trim().is_empty() => Err(TradelogError::ConfigInvalid {
            section: "export".to_string(),
            key: "output_dir".to_string(),
            reason: "output_dir must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}
