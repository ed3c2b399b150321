//! Equity-curve risk metrics: drawdown, Sharpe ratio and yearly returns.

use chrono::{Datelike, NaiveDateTime};
use std::collections::BTreeMap;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Drawdown {
    /// Deepest drop below the running peak, in percent of that peak.
    pub max_pct: f64,
    /// Deepest drop below the running peak, in money.
    pub max_money: f64,
}

pub fn compute_drawdown(equity_curve: &[EquityPoint]) -> Drawdown {
    let Some(first) = equity_curve.first() else {
        return Drawdown::default();
    };

    let mut peak = first.equity;
    let mut result = Drawdown::default();

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            continue;
        }
        let money = peak - point.equity;
        result.max_money = result.max_money.max(money);
        if peak > 0.0 {
            result.max_pct = result.max_pct.max(money / peak * 100.0);
        }
    }

    result
}

/// Annualized Sharpe ratio of point-to-point returns against an annual
/// risk-free rate. 0 with fewer than two points or flat returns.
pub fn compute_sharpe(equity_curve: &[EquityPoint], risk_free_rate: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            if prev > 0.0 {
                (w[1].equity - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    if stddev > 0.0 {
        (mean - daily_rf) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

/// Return of each calendar year, measured from the last value of the
/// previous year (or the first value of the curve) to the year's last value.
pub fn annual_returns(equity_curve: &[EquityPoint]) -> BTreeMap<i32, f64> {
    let mut returns = BTreeMap::new();
    let Some(first) = equity_curve.first() else {
        return returns;
    };

    let mut year = first.timestamp.year();
    let mut base = first.equity;
    let mut last = first.equity;

    for point in equity_curve {
        let point_year = point.timestamp.year();
        if point_year != year {
            returns.insert(year, period_return(base, last));
            base = last;
            year = point_year;
        }
        last = point.equity;
    }
    returns.insert(year, period_return(base, last));
    returns
}

fn period_return(start: f64, end: f64) -> f64 {
    if start != 0.0 { end / start - 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_equity_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i as i64),
                equity: v,
            })
            .collect()
    }

    fn point(y: i32, m: u32, d: u32, equity: f64) -> EquityPoint {
        EquityPoint {
            timestamp: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            equity,
        }
    }

    #[test]
    fn max_drawdown() {
        let curve = make_equity_curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        let dd = compute_drawdown(&curve);
        assert!((dd.max_pct - (110.0 - 80.0) / 110.0 * 100.0).abs() < 1e-9);
        assert!((dd.max_money - 30.0).abs() < 1e-9);
    }

    #[test]
    fn drawdown_empty_curve() {
        assert_eq!(compute_drawdown(&[]), Drawdown::default());
    }

    #[test]
    fn drawdown_rising_curve_is_zero() {
        let curve = make_equity_curve(&[1.0, 2.0, 3.0]);
        let dd = compute_drawdown(&curve);
        assert!((dd.max_pct - 0.0).abs() < f64::EPSILON);
        assert!((dd.max_money - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sharpe_ratio_positive() {
        let mut values = vec![100_000.0];
        for i in 1..253 {
            values.push(100_000.0 * (1.0 + 0.001 * (i as f64)));
        }
        let curve = make_equity_curve(&values);
        assert!(compute_sharpe(&curve, 0.0) > 0.0);
    }

    #[test]
    fn sharpe_flat_curve_is_zero() {
        let curve = make_equity_curve(&[100.0, 100.0, 100.0]);
        assert!((compute_sharpe(&curve, 0.02) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sharpe_needs_two_points() {
        let curve = make_equity_curve(&[100.0]);
        assert!((compute_sharpe(&curve, 0.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn annual_returns_chain_years() {
        let curve = vec![
            point(2022, 1, 3, 100.0),
            point(2022, 12, 30, 110.0),
            point(2023, 6, 1, 120.0),
            point(2023, 12, 29, 99.0),
        ];
        let years = annual_returns(&curve);
        assert_eq!(years.len(), 2);
        assert!((years[&2022] - 0.10).abs() < 1e-12);
        assert!((years[&2023] - (99.0 / 110.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn annual_returns_empty_curve() {
        assert!(annual_returns(&[]).is_empty());
    }
}
