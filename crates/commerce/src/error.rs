//! Unified error taxonomy for the commerce core.
//!
//! Every operation returns `Result<T, CommerceError>`. Each variant maps to
//! a stable machine-readable code via [`CommerceError::code`]; messages are
//! safe to show to callers and never include internal state.

use clementine_core::OrderStatus;
use thiserror::Error;

/// Errors produced by the commerce core.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"product"` or `"order"`.
        entity: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// Requested quantity exceeds available stock.
    #[error("not enough stock for {product}: requested {requested}, only {available} available")]
    InsufficientStock {
        /// Product display name.
        product: String,
        /// Quantity the caller asked for.
        requested: i64,
        /// Quantity currently in stock.
        available: i64,
    },

    /// A quantity was negative (or zero where a positive amount is required).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// An order was submitted with no line items.
    #[error("order has no items")]
    EmptyOrder,

    /// The order has been delivered and can no longer change.
    #[error("order has already been delivered")]
    AlreadyFinalized,

    /// The requested status change would move the order backwards.
    #[error("order status cannot move from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// The payment gateway signature did not match.
    #[error("payment verification failed")]
    PaymentVerificationFailed,

    /// The caller is neither the order owner nor an admin.
    #[error("caller is not authorized to access this order")]
    Unauthorized,
}

impl CommerceError {
    /// Convenience constructor for [`CommerceError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code for this error.
    ///
    /// Codes are part of the external contract; renaming one is a breaking
    /// change for API consumers.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::EmptyOrder => "empty_order",
            Self::AlreadyFinalized => "already_finalized",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::PaymentVerificationFailed => "payment_verification_failed",
            Self::Unauthorized => "unauthorized",
        }
    }
}

/// Result type alias for `CommerceError`.
pub type Result<T> = std::result::Result<T, CommerceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use clementine_core::ProductId;

    #[test]
    fn test_display_includes_stock_numbers() {
        let err = CommerceError::InsufficientStock {
            product: "Heirloom Tomatoes".to_string(),
            requested: 4,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("Heirloom Tomatoes"));
        assert!(msg.contains('4'));
        assert!(msg.contains('1'));
    }

    #[test]
    fn test_not_found_constructor() {
        let id = ProductId::generate();
        let err = CommerceError::not_found("product", id);
        assert_eq!(err.to_string(), format!("product not found: {id}"));
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            CommerceError::not_found("order", "x").code(),
            "not_found"
        );
        assert_eq!(CommerceError::EmptyOrder.code(), "empty_order");
        assert_eq!(CommerceError::InvalidQuantity(-2).code(), "invalid_quantity");
        assert_eq!(CommerceError::AlreadyFinalized.code(), "already_finalized");
        assert_eq!(
            CommerceError::PaymentVerificationFailed.code(),
            "payment_verification_failed"
        );
        assert_eq!(CommerceError::Unauthorized.code(), "unauthorized");
    }
}
