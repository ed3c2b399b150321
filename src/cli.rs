//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvNotificationAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::equity_curve_adapter::EquityCurveAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::analyzer::{AnalysisResults, TradeLogAnalyzer, split_by_instrument};
use crate::domain::config_validation::{AnalysisConfig, ExportFormat, validate_analysis_config};
use crate::domain::error::TradelogError;
use crate::domain::report::{Meta, Performance, Report, TradesSummary};
use crate::domain::strategy_stats::RiskMetrics;
use crate::ports::notification_port::NotificationPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradelog", about = "Trade-log analyzer and report builder")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild trades from a notification log and write reports
    Analyze(AnalyzeArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Notification CSV exported by the backtest engine
    #[arg(short, long)]
    pub input: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Equity curve CSV (`timestamp,equity`) used for risk and yearly returns
    #[arg(short, long)]
    pub equity: Option<PathBuf>,
    #[arg(short, long)]
    pub strategy: Option<String>,
    #[arg(long)]
    pub data_name: Option<String>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// csv, json or both
    #[arg(short, long)]
    pub format: Option<String>,
    #[arg(long)]
    pub initial_equity: Option<f64>,
    /// One builder per instrument, merged after the run
    #[arg(long)]
    pub parallel: bool,
}

/// Everything one `analyze` run produced.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub results: AnalysisResults,
    pub report: Report,
    pub written: Vec<PathBuf>,
    /// Closes that arrived without a recorded open.
    pub synthesized: usize,
    /// Trades still open when the feed ended.
    pub discarded: usize,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze(args) => run_analyze(&args),
        Command::Validate { config } => run_validate(&config),
    }
}

fn run_analyze(args: &AnalyzeArgs) -> ExitCode {
    match analyze(args) {
        Ok(outcome) => {
            print_summary(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let result = FileConfigAdapter::from_file(config_path)
        .and_then(|adapter| validate_analysis_config(&adapter).map(|_| adapter))
        .and_then(|adapter| AnalysisConfig::from_port(&adapter));

    match result {
        Ok(config) => {
            eprintln!("  strategy:   {}", config.strategy_name.unwrap_or_default());
            eprintln!("  output dir: {}", config.output_dir.display());
            eprintln!("  format:     {:?}", config.format);
            eprintln!("  parallel:   {}", config.parallel);
            eprintln!("\nConfig is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Resolves the effective configuration: file values first, then CLI flags.
pub fn resolve_config(args: &AnalyzeArgs) -> Result<AnalysisConfig, TradelogError> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            let adapter = FileConfigAdapter::from_file(path)?;
            AnalysisConfig::from_port(&adapter)?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(name) = args.strategy.as_deref().filter(|s| !s.trim().is_empty()) {
        config.strategy_name = Some(name.trim().to_string());
    }
    if let Some(name) = &args.data_name {
        config.data_name = Some(name.clone());
    }
    if let Some(dir) = &args.output {
        config.output_dir = dir.clone();
    }
    if let Some(format) = &args.format {
        config.format = format.parse::<ExportFormat>()?;
    }
    if let Some(equity) = args.initial_equity {
        if !(equity > 0.0 && equity.is_finite()) {
            return Err(TradelogError::ConfigInvalid {
                section: "run".to_string(),
                key: "initial_equity".to_string(),
                reason: "initial_equity must be a positive number".to_string(),
            });
        }
        config.initial_equity = Some(equity);
    }
    if args.parallel {
        config.parallel = true;
    }

    if config.strategy_name.is_none() {
        return Err(TradelogError::ConfigMissing {
            section: "run".to_string(),
            key: "strategy_name".to_string(),
        });
    }
    Ok(config)
}

/// Full pipeline: read notifications, rebuild trades, aggregate, assemble
/// the report and export it.
pub fn analyze(args: &AnalyzeArgs) -> Result<AnalysisOutcome, TradelogError> {
    let config = resolve_config(args)?;
    let strategy_name = config.strategy_name.clone().unwrap_or_default();

    info!(path = %args.input.display(), "reading notifications");
    let notifications = CsvNotificationAdapter::new(args.input.clone()).notifications()?;
    info!(count = notifications.len(), strategy = %strategy_name, "notifications loaded");

    let analyzer = if config.parallel {
        let streams = split_by_instrument(notifications);
        info!(streams = streams.len(), "analyzing instruments in parallel");
        TradeLogAnalyzer::analyze_parallel(&strategy_name, streams)?
    } else {
        let mut analyzer = TradeLogAnalyzer::new(strategy_name.as_str());
        analyzer.ingest(&notifications)?;
        analyzer.finish();
        analyzer
    };

    let synthesized = analyzer.synthesized_count();
    let discarded = analyzer.discarded_count();
    if synthesized > 0 {
        warn!(synthesized, "closes without a matching open were approximated");
    }
    if discarded > 0 {
        warn!(discarded, "run ended with open trades");
    }

    let equity = match &args.equity {
        Some(path) => Some(EquityCurveAdapter::from_file(path, config.risk_free_rate)?),
        None => None,
    };
    let risk = equity.as_ref().map(|provider| RiskMetrics::collect(provider));

    let results = analyzer.results(risk.as_ref());
    let report = build_report(&config, &strategy_name, &results, equity.as_ref());

    let mut written = Vec::new();
    if config.format.writes_csv() {
        written.extend(CsvReportAdapter::new(&config.output_dir).write_all(&results, &report)?);
    }
    if config.format.writes_json() {
        written.extend(JsonReportAdapter::new(&config.output_dir).write_all(&results, &report)?);
    }
    for path in &written {
        info!(path = %path.display(), "written");
    }

    Ok(AnalysisOutcome {
        results,
        report,
        written,
        synthesized,
        discarded,
    })
}

fn build_report(
    config: &AnalysisConfig,
    strategy_name: &str,
    results: &AnalysisResults,
    equity: Option<&EquityCurveAdapter>,
) -> Report {
    let mut meta = Meta::new(strategy_name);
    meta.data_name = config.data_name.clone();
    meta.equity_start = config.initial_equity;

    let performance = match equity {
        Some(curve) => {
            meta.start_datetime = curve.first().map(|p| p.timestamp);
            meta.end_datetime = curve.last().map(|p| p.timestamp);
            meta.bars = Some(curve.curve().len() as u64);
            meta.equity_start = meta.equity_start.or(curve.first().map(|p| p.equity));
            meta.equity_end = curve.last().map(|p| p.equity);
            Performance::from_annual_returns(curve.annual_returns())
        }
        None => {
            meta.start_datetime = results.log.iter().map(|t| t.entry_time).min();
            meta.end_datetime = results.log.iter().map(|t| t.exit_time).max();
            Performance::default()
        }
    };

    Report::assemble(
        meta,
        performance,
        TradesSummary::from_trades(&results.log),
        results.log.clone(),
    )
}

fn print_summary(outcome: &AnalysisOutcome) {
    let global = &outcome.results.global;
    eprintln!("\n=== Strategy Summary: {} ===", global.strategy_id);
    eprintln!("Total Trades:     {}", global.total_trades);
    eprintln!("Total PnL:        {:.2}", global.total_pnl);
    eprintln!("Win Rate:         {:.1}%", global.win_rate);
    eprintln!("Profit Factor:    {:.2}", global.profit_factor);
    eprintln!("Max Drawdown:     -{:.1}%", global.max_drawdown_pct);
    eprintln!("Sharpe Ratio:     {:.2}", global.sharpe_ratio);
    eprintln!("Best Symbol:      {}", global.best_symbol);
    eprintln!("Worst Symbol:     {}", global.worst_symbol);
    if outcome.synthesized > 0 {
        eprintln!("Unmatched Closes: {}", outcome.synthesized);
    }
    if outcome.discarded > 0 {
        eprintln!("Still Open:       {}", outcome.discarded);
    }

    if !outcome.results.by_symbol.is_empty() {
        eprintln!("\n=== Per-Symbol Summary ===");
        for stat in &outcome.results.by_symbol {
            let pnl_sign = if stat.net_profit >= 0.0 { "+" } else { "" };
            eprintln!(
                "  {}:  {} trades, {:.1}% win rate, {}{:.2}",
                stat.symbol, stat.total_trades, stat.win_rate, pnl_sign, stat.net_profit,
            );
        }
    }

    if !outcome.written.is_empty() {
        eprintln!("\nReports written:");
        for path in &outcome.written {
            eprintln!("  {}", path.display());
        }
    }
}
