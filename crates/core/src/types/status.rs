//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Orders move strictly forward: `Processing` -> `Shipped` -> `Delivered`.
/// Once `Delivered` the order is immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Position in the lifecycle; a transition is only valid when the
    /// target rank is strictly greater than the current rank.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Processing => 0,
            Self::Shipped => 1,
            Self::Delivered => 2,
        }
    }

    /// Whether the order has reached its terminal state.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "Processing"),
            Self::Shipped => write!(f, "Shipped"),
            Self::Delivered => write!(f, "Delivered"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment status on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_rank_is_monotonic() {
        assert!(OrderStatus::Processing.rank() < OrderStatus::Shipped.rank());
        assert!(OrderStatus::Shipped.rank() < OrderStatus::Delivered.rank());
    }

    #[test]
    fn test_only_delivered_is_final() {
        assert!(!OrderStatus::Processing.is_final());
        assert!(!OrderStatus::Shipped.is_final());
        assert!(OrderStatus::Delivered.is_final());
    }

    #[test]
    fn test_display_from_str_round_trip() {
        for status in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let parsed = OrderStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!(OrderStatus::from_str("Cancelled").is_err());
    }

    #[test]
    fn test_payment_status_serde() {
        let json = serde_json::to_string(&PaymentStatus::Paid).unwrap();
        assert_eq!(json, "\"paid\"");
    }
}
