//! Coupon domain model.
//!
//! Coupons are read-only at order time: the order flow looks one up by code
//! and applies it, but never mutates it. There is deliberately no redemption
//! counter (see DESIGN.md).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::CouponId;

/// A percentage-off coupon with a validity window and a discount cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique coupon ID.
    pub id: CouponId,
    /// Unique code, stored uppercase.
    pub code: String,
    /// Discount percentage, 1-100.
    pub discount: u8,
    /// Minimum items total for the coupon to apply.
    pub min_purchase: Decimal,
    /// Cap on the discount amount.
    pub max_discount: Decimal,
    /// Start of the validity window (inclusive).
    pub starts_at: DateTime<Utc>,
    /// End of the validity window (inclusive).
    pub expires_at: DateTime<Utc>,
    /// Whether the coupon is currently enabled.
    pub active: bool,
    /// When the coupon was created.
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon can be applied at `now`: it must be active and
    /// `now` must fall within the validity window.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.starts_at <= now && now <= self.expires_at
    }
}

/// Normalize a user-supplied coupon code for lookup: trim and uppercase.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
