//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod equity_curve_adapter;
pub mod file_config_adapter;
pub mod json_report_adapter;

/// Strategy name made safe for use in a file name.
pub(crate) fn file_stem(strategy_name: &str) -> String {
    let stem: String = strategy_name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "unnamed".to_string() } else { stem }
}
