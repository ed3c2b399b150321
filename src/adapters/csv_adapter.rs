//! CSV notification source.
//!
//! Expected header:
//! `session_id,instrument,is_open,is_close,timestamp,price,size,pnl_gross,pnl_net,equity,bar`.
//! `pnl_net` and `bar` may be left empty. `timestamp` is either an ISO
//! datetime/date or a numeric day serial.

use crate::domain::error::TradelogError;
use crate::domain::notification::{SessionId, Timestamp, TradeNotification};
use crate::ports::notification_port::NotificationPort;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct NotificationRow {
    session_id: String,
    instrument: String,
    is_open: String,
    is_close: String,
    timestamp: String,
    price: f64,
    size: f64,
    pnl_gross: f64,
    pnl_net: Option<f64>,
    equity: f64,
    bar: Option<u64>,
}

pub struct CsvNotificationAdapter {
    path: PathBuf,
}

impl CsvNotificationAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }

    fn parse_rows(&self, content: &str) -> Result<Vec<TradeNotification>, TradelogError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut notifications = Vec::new();

        for (line, result) in rdr.deserialize::<NotificationRow>().enumerate() {
            let row = result.map_err(|e| {
                TradelogError::input(self.source_name(), format!("row {}: {}", line + 1, e))
            })?;
            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
                TradelogError::input(
                    self.source_name(),
                    format!("row {}: invalid timestamp '{}'", line + 1, row.timestamp),
                )
            })?;
            let is_open = parse_flag(&row.is_open).ok_or_else(|| {
                TradelogError::input(self.source_name(), format!("row {}: invalid is_open", line + 1))
            })?;
            let is_close = parse_flag(&row.is_close).ok_or_else(|| {
                TradelogError::input(self.source_name(), format!("row {}: invalid is_close", line + 1))
            })?;

            notifications.push(TradeNotification {
                session_id: SessionId(row.session_id),
                instrument: row.instrument,
                is_open,
                is_close,
                timestamp,
                price: row.price,
                size: row.size,
                pnl_gross: row.pnl_gross,
                pnl_net: row.pnl_net,
                equity: row.equity,
                bar: row.bar,
            });
        }

        Ok(notifications)
    }
}

impl NotificationPort for CsvNotificationAdapter {
    fn notifications(&self) -> Result<Vec<TradeNotification>, TradelogError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            TradelogError::input(self.source_name(), format!("failed to read: {}", e))
        })?;
        self.parse_rows(&content)
    }
}

/// Numeric text is a day serial; otherwise an ISO datetime or plain date.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(serial) = raw.parse::<f64>() {
        return Some(Timestamp::Serial(serial));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Timestamp::DateTime(dt));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(Timestamp::from)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
