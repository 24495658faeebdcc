//! Order lifecycle manager.
//!
//! Composes the stock validator, pricing engine, and inventory ledger into
//! the checkout flow, and owns the forward-only status state machine
//! (`Processing` -> `Shipped` -> `Delivered`).
//!
//! Order creation is a read-validate-write sequence, not a transaction: the
//! order document is persisted before the per-line stock deductions run. A
//! deduction that fails (for example, losing a race for the last unit)
//! surfaces to the caller while the order document remains behind; see
//! DESIGN.md for why that window is accepted and how reconciliation covers
//! it.

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use tracing::instrument;

use clementine_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use crate::db::{CouponStore, InventoryStore, OrderStore, ProductStore};
use crate::error::{CommerceError, Result};
use crate::inventory::InventoryLedger;
use crate::models::coupon::normalize_code;
use crate::models::{Order, OrderItem, OrderLine, PaymentInfo, ShippingInfo};
use crate::notify::NotificationSender;
use crate::payment;
use crate::pricing::{self, PricingPolicy};
use crate::stock;

/// Reason string recorded on ledger entries written by checkout.
const DEDUCT_REASON: &str = "order placed";

/// Order lifecycle manager over a backing store and a notification sender.
pub struct OrderService<S, N> {
    store: Arc<S>,
    ledger: InventoryLedger<S>,
    notifier: N,
    pricing: PricingPolicy,
}

impl<S, N> OrderService<S, N>
where
    S: ProductStore + CouponStore + OrderStore + InventoryStore,
    N: NotificationSender,
{
    /// Create a service with the given pricing policy.
    pub fn new(store: Arc<S>, notifier: N, pricing: PricingPolicy) -> Self {
        let ledger = InventoryLedger::new(Arc::clone(&store));
        Self {
            store,
            ledger,
            notifier,
            pricing,
        }
    }

    /// Override the low-stock threshold new inventory records open with.
    ///
    /// Deployments pass [`crate::config::CommerceConfig::low_stock_threshold`]
    /// here.
    #[must_use]
    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.ledger = self.ledger.with_low_stock_threshold(threshold);
        self
    }

    /// The ledger this service writes stock changes through.
    pub const fn ledger(&self) -> &InventoryLedger<S> {
        &self.ledger
    }

    /// Create an order from a checkout request.
    ///
    /// Validates every line before any write; prices come from the resolved
    /// products and the optional coupon (an unknown, inactive, or expired
    /// code is silently ignored). The order only records a coupon reference
    /// when its discount was actually applied; a code that resolved but
    /// missed its minimum purchase leaves `coupon` unset. Item name, unit
    /// price, and image are
    /// snapshotted onto the order so later catalog edits do not rewrite
    /// history. Stock is then deducted per line, sequentially, through the
    /// ledger. The confirmation notification is fire-and-continue.
    ///
    /// # Errors
    ///
    /// - `EmptyOrder` when `lines` is empty
    /// - `InvalidQuantity`, `NotFound`, or `InsufficientStock` from validation
    /// - `InsufficientStock` from a lost race during deduction (the order
    ///   document has already been persisted in that case)
    #[instrument(skip(self, lines, shipping), fields(user = %user, lines = lines.len()))]
    pub async fn create_order(
        &self,
        user: UserId,
        contact: &str,
        lines: &[OrderLine],
        shipping: ShippingInfo,
        payment_method: &str,
        coupon_code: Option<&str>,
    ) -> Result<Order> {
        if lines.is_empty() {
            return Err(CommerceError::EmptyOrder);
        }

        let resolved = stock::validate(self.store.as_ref(), lines).await?;
        let now = Utc::now();

        let coupon = match coupon_code {
            Some(code) => {
                self.store
                    .find_valid_by_code(&normalize_code(code), now)
                    .await?
            }
            None => None,
        };

        let unit_prices: Vec<_> = resolved
            .iter()
            .map(|line| (line.product.price, line.quantity))
            .collect();
        let prices = pricing::quote(&unit_prices, coupon.as_ref(), now, &self.pricing);

        let items: Vec<OrderItem> = resolved
            .iter()
            .map(|line| OrderItem {
                name: line.product.name.clone(),
                price: line.product.price,
                quantity: line.quantity,
                image: line.product.primary_image().unwrap_or_default().to_string(),
                product: line.product.id,
            })
            .collect();

        let order = Order {
            id: OrderId::generate(),
            user,
            contact: contact.to_string(),
            items,
            shipping,
            payment: PaymentInfo {
                transaction_id: None,
                status: PaymentStatus::Pending,
                method: payment_method.to_string(),
            },
            items_price: prices.items_price,
            tax_price: prices.tax_price,
            shipping_price: prices.shipping_price,
            discount_amount: prices.discount_amount,
            total_price: prices.total_price,
            status: OrderStatus::Processing,
            coupon: coupon.filter(|_| prices.coupon_applied).map(|c| c.id),
            created_at: now,
            paid_at: None,
            shipped_at: None,
            delivered_at: None,
        };

        self.store.insert_order(order.clone()).await?;

        // Sequential per line so the audit history ordering stays
        // deterministic per product.
        for line in &resolved {
            self.ledger
                .deduct(line.product.id, line.quantity, DEDUCT_REASON, Some(user))
                .await?;
        }

        tracing::info!(order = %order.id, total = %order.total_price, "order created");

        self.notify(
            contact,
            "Order Confirmation",
            &format!(
                "Your order has been placed successfully. Order ID: {}",
                order.id
            ),
        )
        .await;

        Ok(order)
    }

    /// Fetch an order, enforcing that the caller owns it or is an admin.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist, or `Unauthorized`
    /// when the caller is neither the owner nor an admin.
    pub async fn get_order(&self, id: OrderId, caller: UserId, is_admin: bool) -> Result<Order> {
        let order = self
            .store
            .find_order(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("order", id))?;

        if order.user != caller && !is_admin {
            return Err(CommerceError::Unauthorized);
        }

        Ok(order)
    }

    /// All orders placed by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>> {
        self.store.orders_by_user(user).await
    }

    /// Move an order forward in the lifecycle.
    ///
    /// Stamps `shipped_at` / `delivered_at` on the corresponding
    /// transitions and sends a best-effort status notification.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order does not exist
    /// - `AlreadyFinalized` if the order is already `Delivered`
    /// - `InvalidTransition` when `new_status` does not move forward
    #[instrument(skip(self), fields(order = %id))]
    pub async fn update_status(
        &self,
        id: OrderId,
        new_status: OrderStatus,
        _acting_user: UserId,
    ) -> Result<Order> {
        let mut order = self
            .store
            .find_order(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("order", id))?;

        if order.status.is_final() {
            return Err(CommerceError::AlreadyFinalized);
        }

        if new_status.rank() <= order.status.rank() {
            return Err(CommerceError::InvalidTransition {
                from: order.status,
                to: new_status,
            });
        }

        let now = Utc::now();
        match new_status {
            OrderStatus::Shipped => order.shipped_at = Some(now),
            OrderStatus::Delivered => order.delivered_at = Some(now),
            OrderStatus::Processing => {}
        }
        order.status = new_status;

        self.store.update_order(order.clone()).await?;

        tracing::info!(order = %id, status = %new_status, "order status updated");

        self.notify(
            &order.contact,
            "Order Status Update",
            &format!("Your order status has been updated to {new_status}"),
        )
        .await;

        Ok(order)
    }

    /// Verify a gateway capture and mark the order paid.
    ///
    /// # Errors
    ///
    /// Returns `PaymentVerificationFailed` on a bad signature (before any
    /// write), or `NotFound` if the order does not exist.
    #[instrument(skip(self, signature, secret), fields(order = %id))]
    pub async fn verify_and_record_payment(
        &self,
        id: OrderId,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
        secret: &SecretString,
    ) -> Result<Order> {
        payment::verify_signature(gateway_order_id, gateway_payment_id, signature, secret)?;

        let mut order = self
            .store
            .find_order(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("order", id))?;

        order.payment.transaction_id = Some(gateway_payment_id.to_string());
        order.payment.status = PaymentStatus::Paid;
        order.paid_at = Some(Utc::now());

        self.store.update_order(order.clone()).await?;

        tracing::info!(order = %id, "payment recorded");
        Ok(order)
    }

    /// Delete an order.
    ///
    /// Stock deducted at creation is not restored; deletion is an
    /// administrative removal, not a cancellation (see DESIGN.md).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order = %id))]
    pub async fn delete_order(&self, id: OrderId) -> Result<()> {
        self.store.delete_order(id).await?;
        tracing::info!(order = %id, "order deleted");
        Ok(())
    }

    /// Send a notification, logging failures instead of propagating them.
    async fn notify(&self, recipient: &str, subject: &str, body: &str) {
        if let Err(err) = self.notifier.send(recipient, subject, body).await {
            tracing::warn!(error = %err, recipient, subject, "notification failed");
        }
    }
}
