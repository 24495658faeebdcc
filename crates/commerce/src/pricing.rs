//! Pure price breakdown computation.
//!
//! Given server-trusted `(unit price, quantity)` pairs and an optional
//! coupon, [`quote`] produces the itemized breakdown persisted on an order.
//! No side effects; deterministic for a given input and clock value.
//!
//! All derived amounts are rounded to 2 decimal places, half-up, after each
//! computation step so the persisted fields always satisfy
//! `total = items + tax + shipping - discount`.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::Coupon;

/// Pricing policy constants.
///
/// The defaults match the store's standing policy: 10% tax, free shipping
/// strictly above 100, flat fee of 10 otherwise. Deployments override them
/// through [`crate::config::CommerceConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Tax rate applied to the items total.
    pub tax_rate: Decimal,
    /// Items total above which (strictly) shipping is free.
    pub free_shipping_over: Decimal,
    /// Flat shipping fee below the threshold.
    pub flat_shipping_fee: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2),
            free_shipping_over: Decimal::ONE_HUNDRED,
            flat_shipping_fee: Decimal::TEN,
        }
    }
}

/// Itemized price breakdown for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Sum of unit price x quantity over all lines.
    pub items_price: Decimal,
    /// Tax on the items total.
    pub tax_price: Decimal,
    /// Shipping fee.
    pub shipping_price: Decimal,
    /// Coupon discount, zero when no coupon was eligible.
    pub discount_amount: Decimal,
    /// `items + tax + shipping - discount`, clamped at zero.
    pub total_price: Decimal,
    /// Whether the coupon was eligible and its discount applied. A coupon
    /// that resolved but missed its minimum purchase (or its validity
    /// window) leaves this false.
    pub coupon_applied: bool,
}

/// Round to currency precision (2 decimal places, half-up).
fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute the price breakdown for a set of lines.
///
/// `lines` are `(unit_price, quantity)` pairs taken from the resolved
/// products, never from the client. A coupon only contributes a discount
/// when it is valid at `now` and the items total meets its minimum
/// purchase; the discount is capped at the coupon's `max_discount` and can
/// never exceed the items total. `coupon_applied` reports whether the
/// coupon made it through that filter, so callers can tell an applied
/// coupon from one that was silently ignored.
#[must_use]
pub fn quote(
    lines: &[(Decimal, i64)],
    coupon: Option<&Coupon>,
    now: DateTime<Utc>,
    policy: &PricingPolicy,
) -> PriceBreakdown {
    let items_price = round_currency(
        lines
            .iter()
            .map(|&(price, quantity)| price * Decimal::from(quantity))
            .sum(),
    );

    let tax_price = round_currency(items_price * policy.tax_rate);

    let shipping_price = if items_price > policy.free_shipping_over {
        Decimal::ZERO
    } else {
        policy.flat_shipping_fee
    };

    let eligible = coupon.filter(|c| c.is_valid_at(now) && items_price >= c.min_purchase);

    let discount_amount = eligible.map_or(Decimal::ZERO, |c| {
        let raw = items_price * Decimal::from(c.discount) / Decimal::ONE_HUNDRED;
        round_currency(raw.min(c.max_discount).min(items_price))
    });

    let total_price = round_currency(
        (items_price + tax_price + shipping_price - discount_amount).max(Decimal::ZERO),
    );

    PriceBreakdown {
        items_price,
        tax_price,
        shipping_price,
        discount_amount,
        total_price,
        coupon_applied: eligible.is_some(),
    }
}
