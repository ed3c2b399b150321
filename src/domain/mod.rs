//! Core domain types and logic.

pub mod analyzer;
pub mod builder;
pub mod config_validation;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod notification;
pub mod report;
pub mod strategy_stats;
pub mod symbol_stats;
pub mod trade;
