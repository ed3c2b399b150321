//! External risk-metric providers.

use crate::domain::error::TradelogError;

/// Peak-to-trough drawdown as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawdownStats {
    /// Largest drawdown in percent of the running peak.
    pub max_drawdown_pct: f64,
    /// Largest drawdown in money.
    pub max_moneydown: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SharpeStats {
    pub sharpe_ratio: f64,
}

/// Optional source of drawdown and Sharpe figures.
///
/// `Ok(None)` means the provider has nothing to report. Both `Ok(None)` and
/// `Err` are treated as 0 by the aggregators.
pub trait RiskMetricsPort {
    fn name(&self) -> &str;

    fn drawdown(&self) -> Result<Option<DrawdownStats>, TradelogError>;

    fn sharpe(&self) -> Result<Option<SharpeStats>, TradelogError>;
}
