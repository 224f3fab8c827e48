use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Order has been created but not yet risk-checked or sent
    Pending,
    /// Order passed risk checks and was handed to the exchange adapter
    Submitted,
    /// Exchange acknowledged the order
    Accepted,
    /// Order has been partially filled
    PartiallyFilled,
    /// Order has been completely filled
    Filled,
    /// Order has been cancelled
    Cancelled,
    /// Order was rejected (risk or exchange)
    Rejected,
    /// Order has expired (time-in-force elapsed)
    Expired,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled
                | OrderStatus::Cancelled
                | OrderStatus::Rejected
                | OrderStatus::Expired
        )
    }

    /// Returns true if the order is still active on the exchange
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::Submitted | OrderStatus::Accepted | OrderStatus::PartiallyFilled
        )
    }

    /// Whether the lifecycle state machine permits moving from `self` to `next`
    pub fn can_transition(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            Pending => matches!(next, Submitted | Rejected),
            Submitted => matches!(
                next,
                Accepted | PartiallyFilled | Filled | Cancelled | Expired | Rejected
            ),
            Accepted => matches!(next, PartiallyFilled | Filled | Cancelled | Expired),
            PartiallyFilled => matches!(next, PartiallyFilled | Filled | Cancelled | Expired),
            // Terminal states accept no further transitions
            Filled | Cancelled | Rejected | Expired => false,
        }
    }
}
