#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::path::PathBuf;
use tradelog::domain::error::TradelogError;
use tradelog::domain::notification::TradeNotification;
use tradelog::domain::report::Report;
use tradelog::domain::strategy_stats::StrategyStat;
use tradelog::domain::symbol_stats::SymbolStat;
use tradelog::domain::trade::FinalizedTrade;
use tradelog::ports::notification_port::NotificationPort;
use tradelog::ports::report_port::ReportPort;
use tradelog::ports::risk_port::{DrawdownStats, RiskMetricsPort, SharpeStats};

pub const EQUITY: f64 = 100_000.0;

pub fn at(date: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn open(session: &str, symbol: &str, date: &str, price: f64, size: f64) -> TradeNotification {
    TradeNotification::open(session, symbol, at(date), price, size, EQUITY)
}

pub fn update(session: &str, symbol: &str, date: &str, price: f64, size: f64) -> TradeNotification {
    TradeNotification::update(session, symbol, at(date), price, size, EQUITY)
}

pub fn close(session: &str, symbol: &str, date: &str, price: f64, pnl_net: f64) -> TradeNotification {
    TradeNotification::close(session, symbol, at(date), price, pnl_net, Some(pnl_net), EQUITY)
}

/// Open and close notifications for one trade.
pub fn round_trip(
    session: &str,
    symbol: &str,
    open_date: &str,
    close_date: &str,
    pnl_net: f64,
) -> Vec<TradeNotification> {
    vec![
        open(session, symbol, open_date, 100.0, 10.0),
        close(session, symbol, close_date, 100.0 + pnl_net / 10.0, pnl_net),
    ]
}

pub struct VecNotificationSource {
    pub notifications: Vec<TradeNotification>,
}

impl NotificationPort for VecNotificationSource {
    fn notifications(&self) -> Result<Vec<TradeNotification>, TradelogError> {
        Ok(self.notifications.clone())
    }
}

pub enum RiskBehaviour {
    Present,
    Absent,
    Failing,
}

pub struct MockRiskPort {
    pub behaviour: RiskBehaviour,
    pub drawdown_pct: f64,
    pub moneydown: f64,
    pub sharpe: f64,
}

impl MockRiskPort {
    pub fn present(drawdown_pct: f64, moneydown: f64, sharpe: f64) -> Self {
        Self {
            behaviour: RiskBehaviour::Present,
            drawdown_pct,
            moneydown,
            sharpe,
        }
    }

    pub fn absent() -> Self {
        Self {
            behaviour: RiskBehaviour::Absent,
            drawdown_pct: 0.0,
            moneydown: 0.0,
            sharpe: 0.0,
        }
    }

    pub fn failing() -> Self {
        Self {
            behaviour: RiskBehaviour::Failing,
            ..Self::absent()
        }
    }

    fn failure(&self) -> TradelogError {
        TradelogError::RiskProvider {
            provider: "mock".into(),
            reason: "analyzer not attached".into(),
        }
    }
}

impl RiskMetricsPort for MockRiskPort {
    fn name(&self) -> &str {
        "mock"
    }

    fn drawdown(&self) -> Result<Option<DrawdownStats>, TradelogError> {
        match self.behaviour {
            RiskBehaviour::Present => Ok(Some(DrawdownStats {
                max_drawdown_pct: self.drawdown_pct,
                max_moneydown: self.moneydown,
            })),
            RiskBehaviour::Absent => Ok(None),
            RiskBehaviour::Failing => Err(self.failure()),
        }
    }

    fn sharpe(&self) -> Result<Option<SharpeStats>, TradelogError> {
        match self.behaviour {
            RiskBehaviour::Present => Ok(Some(SharpeStats {
                sharpe_ratio: self.sharpe,
            })),
            RiskBehaviour::Absent => Ok(None),
            RiskBehaviour::Failing => Err(self.failure()),
        }
    }
}

/// Captures everything written through the port.
#[derive(Default)]
pub struct MockReportPort {
    pub trade_logs: RefCell<Vec<(String, Vec<FinalizedTrade>)>>,
    pub symbol_stats: RefCell<Vec<(String, Vec<SymbolStat>)>>,
    pub strategy_stats: RefCell<Vec<StrategyStat>>,
    pub reports: RefCell<Vec<Report>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportPort for MockReportPort {
    fn write_trade_log(
        &self,
        strategy_name: &str,
        trades: &[FinalizedTrade],
    ) -> Result<PathBuf, TradelogError> {
        self.trade_logs
            .borrow_mut()
            .push((strategy_name.to_string(), trades.to_vec()));
        Ok(PathBuf::from("trade_log"))
    }

    fn write_symbol_stats(
        &self,
        strategy_name: &str,
        stats: &[SymbolStat],
    ) -> Result<PathBuf, TradelogError> {
        self.symbol_stats
            .borrow_mut()
            .push((strategy_name.to_string(), stats.to_vec()));
        Ok(PathBuf::from("symbol_report"))
    }

    fn write_strategy_stat(&self, stat: &StrategyStat) -> Result<PathBuf, TradelogError> {
        self.strategy_stats.borrow_mut().push(stat.clone());
        Ok(PathBuf::from("strategy_summary"))
    }

    fn write_report(&self, report: &Report) -> Result<PathBuf, TradelogError> {
        self.reports.borrow_mut().push(report.clone());
        Ok(PathBuf::from("report"))
    }
}
