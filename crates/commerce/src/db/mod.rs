//! Store traits and implementations.
//!
//! The core is storage-agnostic: every component talks to the data store
//! through the traits in this module. [`MemoryStore`] is the in-process
//! document store used in tests and single-node deployments; a database
//! adapter implements the same traits at the integration layer.
//!
//! # Atomicity contract
//!
//! The store guarantees document-level atomicity plus two cross-document
//! operations the ledger depends on. [`InventoryStore::deduct_stock`] must
//! perform the stock check, the decrement, and the history append as a
//! single atomic step, so concurrent orders can neither drive stock
//! negative nor interleave history entries. And
//! [`InventoryStore::insert_record_if_absent`] must make the existence
//! check and the insert one step, so a concurrent lazy open can never
//! overwrite a record that already carries history.

mod memory;

use chrono::{DateTime, Utc};

use clementine_core::{OrderId, ProductId, UserId};

use crate::error::Result;
use crate::models::{Coupon, InventoryRecord, Order, Product, StockChange};

pub use memory::MemoryStore;

/// Product persistence.
#[allow(async_fn_in_trait)]
pub trait ProductStore: Send + Sync {
    /// Look up a product by ID.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Insert a new product.
    async fn insert_product(&self, product: Product) -> Result<()>;

    /// Overwrite a product's stock count.
    ///
    /// Only the inventory ledger may call this; see the single-writer rule
    /// in DESIGN.md.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    async fn set_stock(&self, id: ProductId, stock: i64) -> Result<()>;
}

/// Coupon persistence.
#[allow(async_fn_in_trait)]
pub trait CouponStore: Send + Sync {
    /// Insert a new coupon.
    async fn insert_coupon(&self, coupon: Coupon) -> Result<()>;

    /// Find a coupon by normalized code that is valid at `now`.
    ///
    /// Returns `None` for unknown, inactive, or out-of-window coupons alike;
    /// the order flow treats all three as "no discount".
    async fn find_valid_by_code(&self, code: &str, now: DateTime<Utc>) -> Result<Option<Coupon>>;
}

/// Order persistence.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Send + Sync {
    /// Look up an order by ID.
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Insert a new order.
    async fn insert_order(&self, order: Order) -> Result<()>;

    /// Replace an existing order document.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    async fn update_order(&self, order: Order) -> Result<()>;

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    async fn delete_order(&self, id: OrderId) -> Result<()>;

    /// All orders placed by a user, oldest first.
    async fn orders_by_user(&self, user: UserId) -> Result<Vec<Order>>;
}

/// Inventory record persistence.
#[allow(async_fn_in_trait)]
pub trait InventoryStore: Send + Sync {
    /// Look up the inventory record for a product.
    async fn find_record(&self, product: ProductId) -> Result<Option<InventoryRecord>>;

    /// Insert or replace an inventory record.
    async fn upsert_record(&self, record: InventoryRecord) -> Result<()>;

    /// Insert a record only when none exists for the product, returning
    /// whichever record is stored afterwards. The existence check and the
    /// insert are one atomic step.
    async fn insert_record_if_absent(&self, record: InventoryRecord) -> Result<InventoryRecord>;

    /// Atomically decrement the product's stock and append the matching
    /// sale entry to its record, moving the record's quantity in the same
    /// step. Returns the remaining quantity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product or its record does not exist, or
    /// `InsufficientStock` when fewer than `amount` units remain; nothing
    /// is written in either case.
    async fn deduct_stock(
        &self,
        product: ProductId,
        amount: i64,
        reason: &str,
        acting_user: Option<UserId>,
    ) -> Result<i64>;

    /// Append a history entry and move the record's quantity and
    /// `last_updated` to the entry's values, as one atomic step.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record exists for the product.
    async fn append_change(&self, product: ProductId, entry: StockChange) -> Result<()>;

    /// All inventory records.
    async fn list_records(&self) -> Result<Vec<InventoryRecord>>;
}
