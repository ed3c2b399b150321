//! Risk metrics computed from an equity-curve CSV (`timestamp,equity`).

use crate::adapters::csv_adapter::parse_timestamp;
use crate::domain::error::TradelogError;
use crate::domain::metrics::{EquityPoint, annual_returns, compute_drawdown, compute_sharpe};
use crate::ports::risk_port::{DrawdownStats, RiskMetricsPort, SharpeStats};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct EquityRow {
    timestamp: String,
    equity: f64,
}

pub struct EquityCurveAdapter {
    name: String,
    curve: Vec<EquityPoint>,
    risk_free_rate: f64,
}

impl EquityCurveAdapter {
    pub fn new(name: impl Into<String>, mut curve: Vec<EquityPoint>, risk_free_rate: f64) -> Self {
        curve.sort_by_key(|p| p.timestamp);
        Self {
            name: name.into(),
            curve,
            risk_free_rate,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P, risk_free_rate: f64) -> Result<Self, TradelogError> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| TradelogError::input(&source, format!("failed to read: {}", e)))?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut curve = Vec::new();
        for (line, result) in rdr.deserialize::<EquityRow>().enumerate() {
            let row = result
                .map_err(|e| TradelogError::input(&source, format!("row {}: {}", line + 1, e)))?;
            let timestamp = parse_timestamp(&row.timestamp)
                .and_then(|ts| ts.normalize())
                .ok_or_else(|| {
                    TradelogError::input(
                        &source,
                        format!("row {}: invalid timestamp '{}'", line + 1, row.timestamp),
                    )
                })?;
            curve.push(EquityPoint {
                timestamp,
                equity: row.equity,
            });
        }

        Ok(Self::new(source, curve, risk_free_rate))
    }

    pub fn curve(&self) -> &[EquityPoint] {
        &self.curve
    }

    /// Yearly returns over the points with a finite equity value.
    pub fn annual_returns(&self) -> BTreeMap<i32, f64> {
        let finite: Vec<EquityPoint> = self
            .curve
            .iter()
            .copied()
            .filter(|p| p.equity.is_finite())
            .collect();
        annual_returns(&finite)
    }

    /// Fails when any point has no usable equity value (`NaN`, `inf`).
    fn checked_curve(&self) -> Result<&[EquityPoint], TradelogError> {
        match self.curve.iter().find(|p| !p.equity.is_finite()) {
            Some(bad) => Err(TradelogError::RiskProvider {
                provider: self.name.clone(),
                reason: format!("non-finite equity at {}", bad.timestamp),
            }),
            None => Ok(&self.curve),
        }
    }

    pub fn first(&self) -> Option<&EquityPoint> {
        self.curve.first()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.curve.last()
    }
}

impl RiskMetricsPort for EquityCurveAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn drawdown(&self) -> Result<Option<DrawdownStats>, TradelogError> {
        let curve = self.checked_curve()?;
        if curve.is_empty() {
            return Ok(None);
        }
        let dd = compute_drawdown(curve);
        Ok(Some(DrawdownStats {
            max_drawdown_pct: dd.max_pct,
            max_moneydown: dd.max_money,
        }))
    }

    fn sharpe(&self) -> Result<Option<SharpeStats>, TradelogError> {
        let curve = self.checked_curve()?;
        if curve.len() < 2 {
            return Ok(None);
        }
        Ok(Some(SharpeStats {
            sharpe_ratio: compute_sharpe(curve, self.risk_free_rate),
        }))
    }
}
