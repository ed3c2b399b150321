//! Domain error types.
//!
//! Only contract violations and I/O failures surface as errors. Data edge
//! cases (missing open record, zero notional, absent risk metrics, empty
//! ledger) are recovered inside the domain and never reach the caller.

/// Top-level error type for tradelog.
#[derive(Debug, thiserror::Error)]
pub enum TradelogError {
    #[error("malformed notification for session {session}: {reason}")]
    MalformedNotification { session: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid input {source_name}: {reason}")]
    Input { source_name: String, reason: String },

    #[error("export to {target} failed: {reason}")]
    Export { target: String, reason: String },

    #[error("risk provider {provider} failed: {reason}")]
    RiskProvider { provider: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradelogError {
    pub fn malformed(session: impl Into<String>, reason: impl Into<String>) -> Self {
        TradelogError::MalformedNotification {
            session: session.into(),
            reason: reason.into(),
        }
    }

    pub fn input(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        TradelogError::Input {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn export(target: impl Into<String>, reason: impl Into<String>) -> Self {
        TradelogError::Export {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

impl From<&TradelogError> for std::process::ExitCode {
    fn from(err: &TradelogError) -> Self {
        let code: u8 = match err {
            TradelogError::Io(_) => 1,
            TradelogError::ConfigParse { .. }
            | TradelogError::ConfigMissing { .. }
            | TradelogError::ConfigInvalid { .. } => 2,
            TradelogError::Input { .. } | TradelogError::MalformedNotification { .. } => 3,
            TradelogError::Export { .. } => 4,
            TradelogError::RiskProvider { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
