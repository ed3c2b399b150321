//! Source of trade lifecycle notifications.

use crate::domain::error::TradelogError;
use crate::domain::notification::TradeNotification;

pub trait NotificationPort {
    /// Returns every notification in emission order.
    fn notifications(&self) -> Result<Vec<TradeNotification>, TradelogError>;
}
