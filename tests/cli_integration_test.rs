//! CLI integration tests for the analyze and validate commands.
//!
//! Tests cover:
//! - Config resolution from INI files on disk plus flag overrides
//! - Full analyze pipeline over notification and equity CSV files
//! - Export format selection and written artifacts
//! - Exit codes for config, input and malformed-notification failures

use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;
use tradelog::cli::{self, AnalyzeArgs, Cli};
use tradelog::domain::config_validation::ExportFormat;
use tradelog::domain::error::TradelogError;
use tradelog::domain::report::Report;

const NOTIFICATIONS: &str = "\
session_id,instrument,is_open,is_close,timestamp,price,size,pnl_gross,pnl_net,equity,bar
T1,AAPL,true,false,2023-12-28,100.0,50,0,,100000,1
T2,MSFT,true,false,2024-01-02,200.0,-10,0,,100000,2
T1,AAPL,false,false,2024-01-03,105.0,0,0,,100250,3
T1,AAPL,false,true,2024-01-04,110.0,0,500,450,100450,4
T2,MSFT,false,true,2024-01-05,190.0,0,100,95,100545,5
T3,NVDA,true,false,2024-01-08,50.0,20,0,,100545,6
";

const EQUITY: &str = "\
timestamp,equity
2023-12-28,100000
2023-12-29,100100
2024-01-02,99900
2024-01-03,100250
2024-01-04,100450
2024-01-05,100545
";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    path
}

fn base_args(dir: &Path) -> AnalyzeArgs {
    AnalyzeArgs {
        input: write_file(dir, "notifications.csv", NOTIFICATIONS),
        strategy: Some("Momentum".into()),
        output: Some(dir.join("out")),
        ..AnalyzeArgs::default()
    }
}

fn code(exit: ExitCode) -> String {
    format!("{exit:?}")
}

mod config_resolution {
    use super::*;

    #[test]
    fn config_file_then_flags() {
        let dir = TempDir::new().unwrap();
        let ini = write_file(
            dir.path(),
            "tradelog.ini",
            "[run]\nstrategy_name = FromFile\ndata_name = SPX\n[export]\nformat = csv\n[risk]\nrisk_free_rate = 0.03\n",
        );
        let args = AnalyzeArgs {
            input: PathBuf::from("unused.csv"),
            config: Some(ini),
            format: Some("json".into()),
            ..AnalyzeArgs::default()
        };
        let config = cli::resolve_config(&args).unwrap();
        assert_eq!(config.strategy_name.as_deref(), Some("FromFile"));
        assert_eq!(config.data_name.as_deref(), Some("SPX"));
        assert_eq!(config.format, ExportFormat::Json);
        assert!((config.risk_free_rate - 0.03).abs() < f64::EPSILON);
    }

    #[test]
    fn strategy_flag_overrides_file() {
        let dir = TempDir::new().unwrap();
        let ini = write_file(dir.path(), "tradelog.ini", "[run]\nstrategy_name = FromFile\n");
        let args = AnalyzeArgs {
            input: PathBuf::from("unused.csv"),
            config: Some(ini),
            strategy: Some("FromFlag".into()),
            ..AnalyzeArgs::default()
        };
        let config = cli::resolve_config(&args).unwrap();
        assert_eq!(config.strategy_name.as_deref(), Some("FromFlag"));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let args = AnalyzeArgs {
            input: PathBuf::from("unused.csv"),
            config: Some(PathBuf::from("/nonexistent/tradelog.ini")),
            strategy: Some("S".into()),
            ..AnalyzeArgs::default()
        };
        assert!(matches!(cli::resolve_config(&args), Err(TradelogError::Io(_))));
    }
}

mod analyze_pipeline {
    use super::*;

    #[test]
    fn analyze_writes_csv_and_json() {
        let dir = TempDir::new().unwrap();
        let outcome = cli::analyze(&base_args(dir.path())).unwrap();

        assert_eq!(outcome.results.log.len(), 2);
        assert_eq!(outcome.written.len(), 8);
        assert_eq!(outcome.discarded, 1);
        assert_eq!(outcome.synthesized, 0);
        for name in [
            "trade_log_Momentum.csv",
            "symbol_report_Momentum.csv",
            "strategy_summary_Momentum.csv",
            "summary_Momentum.csv",
            "trade_log_Momentum.json",
            "symbol_report_Momentum.json",
            "strategy_summary_Momentum.json",
            "report_Momentum.json",
        ] {
            assert!(dir.path().join("out").join(name).exists(), "missing {name}");
        }
    }

    #[test]
    fn reconstructed_trades_match_notifications() {
        let dir = TempDir::new().unwrap();
        let outcome = cli::analyze(&base_args(dir.path())).unwrap();
        let log = &outcome.results.log;

        assert_eq!(log[0].symbol, "AAPL");
        assert_eq!(log[0].ticket_id, 1);
        assert_eq!(log[0].side.to_string(), "Long");
        assert!((log[0].size - 50.0).abs() < f64::EPSILON);
        assert!((log[0].pnl_pct - 9.0).abs() < 1e-9);
        assert!((log[0].commission - 50.0).abs() < f64::EPSILON);
        assert_eq!(log[0].bar_len, Some(3));

        assert_eq!(log[1].symbol, "MSFT");
        assert_eq!(log[1].side.to_string(), "Short");
        assert!((log[1].size - -10.0).abs() < f64::EPSILON);
        assert!((log[1].cumulative_pnl - 545.0).abs() < 1e-9);

        let global = &outcome.results.global;
        assert_eq!(global.best_symbol, "AAPL");
        assert_eq!(global.worst_symbol, "MSFT");
        assert!((global.profit_factor - 999.0).abs() < f64::EPSILON);
    }

    #[test]
    fn equity_curve_feeds_risk_and_performance() {
        let dir = TempDir::new().unwrap();
        let mut args = base_args(dir.path());
        args.equity = Some(write_file(dir.path(), "equity.csv", EQUITY));
        args.format = Some("json".into());

        let outcome = cli::analyze(&args).unwrap();
        let global = &outcome.results.global;
        assert!((global.max_drawdown_money - 200.0).abs() < 1e-9);
        assert!(global.max_drawdown_pct > 0.0);

        let perf = &outcome.report.performance;
        assert_eq!(perf.annual_returns.len(), 2);
        assert!((perf.annual_returns[&2023] - 0.001).abs() < 1e-12);
        assert!(perf.total_return.is_some());
        assert_eq!(outcome.report.meta.bars, Some(6));
        assert_eq!(outcome.report.meta.equity_end, Some(100_545.0));

        let json = fs::read_to_string(dir.path().join("out").join("report_Momentum.json")).unwrap();
        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome.report);
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let dir = TempDir::new().unwrap();
        let sequential = cli::analyze(&base_args(dir.path())).unwrap();
        let mut args = base_args(dir.path());
        args.parallel = true;
        let parallel = cli::analyze(&args).unwrap();
        assert_eq!(sequential.results.log, parallel.results.log);
        assert_eq!(sequential.results.by_symbol, parallel.results.by_symbol);
        assert_eq!(sequential.discarded, parallel.discarded);
    }

    #[test]
    fn csv_only_writes_summary_row() {
        let dir = TempDir::new().unwrap();
        let mut args = base_args(dir.path());
        args.format = Some("csv".into());
        let outcome = cli::analyze(&args).unwrap();
        assert_eq!(outcome.written.len(), 4);

        let summary = dir.path().join("out").join("summary_Momentum.csv");
        let mut rdr = csv::Reader::from_path(summary).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert!(headers.iter().any(|h| h == "trades_total_trades"));
        assert!(headers.iter().any(|h| h == "meta_generated_at"));
        assert_eq!(rdr.records().count(), 1);
    }

    #[test]
    fn malformed_notification_aborts() {
        let dir = TempDir::new().unwrap();
        let mut args = base_args(dir.path());
        args.input = write_file(
            dir.path(),
            "bad.csv",
            "session_id,instrument,is_open,is_close,timestamp,price,size,pnl_gross,pnl_net,equity,bar\n\
             T1,,true,false,2024-01-02,100,1,0,,1000,\n",
        );
        let err = cli::analyze(&args).unwrap_err();
        assert!(matches!(err, TradelogError::MalformedNotification { .. }));
        assert_eq!(code(ExitCode::from(&err)), code(ExitCode::from(3)));
    }

    #[test]
    fn close_without_open_is_counted() {
        let dir = TempDir::new().unwrap();
        let mut args = base_args(dir.path());
        args.input = write_file(
            dir.path(),
            "orphan.csv",
            "session_id,instrument,is_open,is_close,timestamp,price,size,pnl_gross,pnl_net,equity,bar\n\
             T9,AMD,false,true,2024-01-05,80.0,-5,40,38,100000,\n",
        );
        args.parallel = true;
        let outcome = cli::analyze(&args).unwrap();
        assert_eq!(outcome.synthesized, 1);
        assert_eq!(outcome.discarded, 0);
        assert_eq!(outcome.results.log.len(), 1);
        assert!((outcome.results.log[0].size - -5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_input_is_input_error() {
        let dir = TempDir::new().unwrap();
        let mut args = base_args(dir.path());
        args.input = dir.path().join("absent.csv");
        assert!(matches!(cli::analyze(&args), Err(TradelogError::Input { .. })));
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_accepts_good_config() {
        let dir = TempDir::new().unwrap();
        let ini = write_file(dir.path(), "ok.ini", "[run]\nstrategy_name = Momentum\n");
        let parsed = Cli::try_parse_from(["tradelog", "validate", "--config", ini.to_str().unwrap()])
            .unwrap();
        assert_eq!(code(cli::run(parsed)), code(ExitCode::SUCCESS));
    }

    #[test]
    fn validate_rejects_missing_strategy() {
        let dir = TempDir::new().unwrap();
        let ini = write_file(dir.path(), "bad.ini", "[export]\nformat = csv\n");
        let parsed = Cli::try_parse_from(["tradelog", "validate", "--config", ini.to_str().unwrap()])
            .unwrap();
        assert_eq!(code(cli::run(parsed)), code(ExitCode::from(2)));
    }

    #[test]
    fn analyze_command_succeeds() {
        let dir = TempDir::new().unwrap();
        let input = write_file(dir.path(), "n.csv", NOTIFICATIONS);
        let out = dir.path().join("reports");
        let parsed = Cli::try_parse_from([
            "tradelog",
            "analyze",
            "--input",
            input.to_str().unwrap(),
            "--strategy",
            "Momentum",
            "--output",
            out.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(code(cli::run(parsed)), code(ExitCode::SUCCESS));
        assert!(out.join("report_Momentum.json").exists());
    }
}
