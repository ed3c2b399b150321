//! Trade lifecycle notifications emitted by the backtest engine.
//!
//! One notification is sent each time a trade opens, changes or closes.
//! The engine identifies a trade by an opaque session id that stays stable
//! for the whole open-to-close lifecycle.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::TradelogError;

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Opaque, comparable identifier of one trade session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        SessionId(value)
    }
}

impl From<u64> for SessionId {
    fn from(value: u64) -> Self {
        SessionId(value.to_string())
    }
}

/// A point in time as reported by the engine.
///
/// Some engines hand out numeric day serials instead of datetimes. A serial
/// counts days on the proleptic Gregorian calendar with `1.0` being
/// `0001-01-01T00:00:00`; the fractional part is the time of day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Timestamp {
    DateTime(NaiveDateTime),
    Serial(f64),
}

impl Timestamp {
    /// Normalizes either representation into a `NaiveDateTime`.
    pub fn normalize(&self) -> Option<NaiveDateTime> {
        match *self {
            Timestamp::DateTime(dt) => Some(dt),
            Timestamp::Serial(serial) => serial_to_datetime(serial),
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Timestamp::DateTime(value)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(value: NaiveDate) -> Self {
        Timestamp::DateTime(value.and_time(chrono::NaiveTime::MIN))
    }
}

/// Converts a day serial into a datetime, or `None` if it is out of range.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let whole = serial.floor();
    let days = i32::try_from(whole as i64).ok()?;
    let date = NaiveDate::from_num_days_from_ce_opt(days)?;
    let micros = ((serial - whole) * MICROS_PER_DAY).round() as i64;
    date.and_time(chrono::NaiveTime::MIN)
        .checked_add_signed(Duration::microseconds(micros))
}

/// One lifecycle event for a trade session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeNotification {
    pub session_id: SessionId,
    pub instrument: String,
    pub is_open: bool,
    pub is_close: bool,
    pub timestamp: Timestamp,
    pub price: f64,
    /// Signed size; the engine reports 0 once the position is closed.
    pub size: f64,
    pub pnl_gross: f64,
    /// PnL after commission, when the engine reports it.
    pub pnl_net: Option<f64>,
    pub equity: f64,
    /// Bar index of the event, when the engine reports it.
    pub bar: Option<u64>,
}

impl TradeNotification {
    pub fn open(
        session_id: impl Into<SessionId>,
        instrument: &str,
        timestamp: impl Into<Timestamp>,
        price: f64,
        size: f64,
        equity: f64,
    ) -> Self {
        TradeNotification {
            session_id: session_id.into(),
            instrument: instrument.to_string(),
            is_open: true,
            is_close: false,
            timestamp: timestamp.into(),
            price,
            size,
            pnl_gross: 0.0,
            pnl_net: None,
            equity,
            bar: None,
        }
    }

    pub fn update(
        session_id: impl Into<SessionId>,
        instrument: &str,
        timestamp: impl Into<Timestamp>,
        price: f64,
        size: f64,
        equity: f64,
    ) -> Self {
        TradeNotification {
            is_open: false,
            ..Self::open(session_id, instrument, timestamp, price, size, equity)
        }
    }

    pub fn close(
        session_id: impl Into<SessionId>,
        instrument: &str,
        timestamp: impl Into<Timestamp>,
        price: f64,
        pnl_gross: f64,
        pnl_net: Option<f64>,
        equity: f64,
    ) -> Self {
        TradeNotification {
            is_open: false,
            is_close: true,
            pnl_gross,
            pnl_net,
            ..Self::open(session_id, instrument, timestamp, price, 0.0, equity)
        }
    }

    pub fn with_bar(mut self, bar: u64) -> Self {
        self.bar = Some(bar);
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Net PnL, falling back to gross when no commission-adjusted figure
    /// was reported.
    pub fn net_pnl(&self) -> f64 {
        self.pnl_net.unwrap_or(self.pnl_gross)
    }

    /// Commission charged over the trade's life; 0 without a net figure.
    pub fn commission(&self) -> f64 {
        self.pnl_net.map(|net| self.pnl_gross - net).unwrap_or(0.0)
    }

    /// Checks the notification contract; violations indicate an integration
    /// bug upstream and must not be recovered from.
    pub fn validate(&self) -> Result<(), TradelogError> {
        if self.instrument.trim().is_empty() {
            return Err(TradelogError::malformed(
                self.session_id.to_string(),
                "empty instrument identifier",
            ));
        }
        if self.timestamp.normalize().is_none() {
            return Err(TradelogError::malformed(
                self.session_id.to_string(),
                format!("timestamp {:?} is not representable", self.timestamp),
            ));
        }
        Ok(())
    }
}
