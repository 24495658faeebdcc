//! Integration tests for Clementine.
//!
//! The harness wires an [`OrderService`] over the in-memory document store
//! and a capturing notification sender, mirroring how the HTTP layer
//! composes the core in production.
//!
//! # Test Categories
//!
//! - `order_flow` - End-to-end checkout, status, payment, and deletion flows
//! - `inventory_audit` - Ledger history invariants and reconciliation

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use clementine_commerce::db::{CouponStore, MemoryStore, ProductStore};
use clementine_commerce::models::{Coupon, Product, ShippingInfo};
use clementine_commerce::notify::{LogSender, NotificationSender, NotifyError};
use clementine_commerce::orders::OrderService;
use clementine_commerce::pricing::PricingPolicy;
use clementine_core::{CouponId, ProductId, UserId};

/// Shared wiring for integration tests.
pub struct TestContext {
    /// The backing store, for direct seeding and inspection.
    pub store: Arc<MemoryStore>,
    /// The capturing notification sender.
    pub sender: Arc<LogSender>,
    /// The service under test.
    pub service: Arc<OrderService<MemoryStore, Arc<LogSender>>>,
}

impl TestContext {
    /// Build a context with the default pricing policy.
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(LogSender::new());
        let service = Arc::new(OrderService::new(
            Arc::clone(&store),
            Arc::clone(&sender),
            PricingPolicy::default(),
        ));
        Self {
            store,
            sender,
            service,
        }
    }

    /// Seed a product and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if the store rejects the insert (it never does in memory).
    pub async fn seed_product(&self, name: &str, price: Decimal, stock: i64) -> ProductId {
        let product = Product {
            id: ProductId::generate(),
            name: name.to_string(),
            price,
            stock,
            images: vec![],
            owner: UserId::generate(),
            created_at: Utc::now(),
        };
        let id = product.id;
        self.store
            .insert_product(product)
            .await
            .expect("insert_product");
        id
    }

    /// Seed an active coupon valid for the next week.
    ///
    /// # Panics
    ///
    /// Panics if the store rejects the insert (it never does in memory).
    pub async fn seed_coupon(
        &self,
        code: &str,
        discount: u8,
        min_purchase: Decimal,
        max_discount: Decimal,
    ) -> CouponId {
        let now = Utc::now();
        let coupon = Coupon {
            id: CouponId::generate(),
            code: code.to_string(),
            discount,
            min_purchase,
            max_discount,
            starts_at: now - Duration::days(1),
            expires_at: now + Duration::days(7),
            active: true,
            created_at: now,
        };
        let id = coupon.id;
        self.store.insert_coupon(coupon).await.expect("insert_coupon");
        id
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A plausible shipping destination.
#[must_use]
pub fn shipping() -> ShippingInfo {
    ShippingInfo {
        address: "48 Juniper Street".to_string(),
        city: "Asheville".to_string(),
        state: "NC".to_string(),
        country: "US".to_string(),
        postal_code: "28801".to_string(),
        phone: "+1 555 012 3456".to_string(),
    }
}

/// A sender whose transport always fails, for fire-and-continue tests.
#[derive(Debug, Default)]
pub struct FailingSender;

impl NotificationSender for FailingSender {
    async fn send(&self, _recipient: &str, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("smtp connection refused".to_string()))
    }
}

/// Initialize test logging once; respects `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
