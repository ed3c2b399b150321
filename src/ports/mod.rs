//! Port traits at the edges of the domain.

pub mod config_port;
pub mod notification_port;
pub mod report_port;
pub mod risk_port;
