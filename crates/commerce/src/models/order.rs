//! Order domain model.
//!
//! Orders snapshot their line items at creation time: name, unit price, and
//! image are copied from the product so later catalog edits never change
//! historical orders. All price fields are server-derived, never taken from
//! the client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{CouponId, OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

/// A requested line item on an inbound checkout: which product, how many.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product being ordered.
    pub product: ProductId,
    /// Requested quantity. Must be positive.
    pub quantity: i64,
}

/// A line item snapshot stored on the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product name at order time.
    pub name: String,
    /// Unit price at order time.
    pub price: Decimal,
    /// Quantity ordered.
    pub quantity: i64,
    /// Primary image URL at order time.
    pub image: String,
    /// Reference back to the product.
    pub product: ProductId,
}

/// Shipping destination for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingInfo {
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Country.
    pub country: String,
    /// Postal code.
    pub postal_code: String,
    /// Contact phone number.
    pub phone: String,
}

/// Payment details on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Gateway transaction ID, set once the payment is verified.
    pub transaction_id: Option<String>,
    /// Whether the order has been paid.
    pub status: PaymentStatus,
    /// Payment method chosen at checkout.
    pub method: String,
}

/// A customer order.
///
/// Invariants: `total_price = items_price + tax_price + shipping_price -
/// discount_amount` (clamped at zero), `discount_amount <= items_price`,
/// and `status` only ever moves forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// User who placed the order.
    pub user: UserId,
    /// Email used for order notifications, captured at checkout.
    pub contact: String,
    /// Line item snapshots.
    pub items: Vec<OrderItem>,
    /// Shipping destination.
    pub shipping: ShippingInfo,
    /// Payment details.
    pub payment: PaymentInfo,
    /// Sum of unit price x quantity over all items.
    pub items_price: Decimal,
    /// Tax on the items total.
    pub tax_price: Decimal,
    /// Flat shipping fee, zero above the free-shipping threshold.
    pub shipping_price: Decimal,
    /// Coupon discount applied, zero when no coupon was eligible.
    pub discount_amount: Decimal,
    /// Final amount due.
    pub total_price: Decimal,
    /// Fulfillment status.
    pub status: OrderStatus,
    /// Coupon applied at checkout, if any.
    pub coupon: Option<CouponId>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the payment was verified.
    pub paid_at: Option<DateTime<Utc>>,
    /// When the order was marked shipped.
    pub shipped_at: Option<DateTime<Utc>>,
    /// When the order was marked delivered.
    pub delivered_at: Option<DateTime<Utc>>,
}
