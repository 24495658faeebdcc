//! Inventory ledger.
//!
//! The single writer path for stock. Every quantity change goes through the
//! ledger, which appends an immutable history entry and keeps the product's
//! denormalized `stock` field synchronized with the record's quantity.
//!
//! Sale deductions commit through [`crate::db::InventoryStore::deduct_stock`],
//! which performs the stock check, the decrement, and the history append as
//! one atomic step. Absolute adjustments remain two store calls (history
//! append, then product sync); a store without a shared lock leaves a
//! partial-failure window there (stock updated, history missing, or the
//! reverse) that [`InventoryLedger::reconcile`] detects and repairs by
//! re-deriving the quantity from the history.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use clementine_core::{ProductId, UserId};

use crate::db::{InventoryStore, ProductStore};
use crate::error::{CommerceError, Result};
use crate::models::inventory::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::models::{InventoryRecord, StockChange};

/// Outcome of a reconciliation pass over one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Product that was checked.
    pub product: ProductId,
    /// Quantity the record claimed before the pass.
    pub recorded_quantity: i64,
    /// Quantity re-derived from the history deltas.
    pub derived_quantity: i64,
    /// Whether the record and product stock were rewritten.
    pub corrected: bool,
}

/// Append-only inventory ledger over a backing store.
pub struct InventoryLedger<S> {
    store: Arc<S>,
    low_stock_threshold: i64,
}

impl<S> Clone for InventoryLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

impl<S: InventoryStore + ProductStore> InventoryLedger<S> {
    /// Create a ledger over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Override the threshold newly opened records are stamped with.
    #[must_use]
    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// Ensure a record exists for a product, opening one from the product's
    /// current stock on first use. Idempotent.
    ///
    /// The open goes through the store's insert-if-absent so a concurrent
    /// first touch of the same product cannot overwrite a record that has
    /// already accumulated history.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product itself does not exist.
    pub async fn track(&self, product: ProductId) -> Result<InventoryRecord> {
        if let Some(record) = self.store.find_record(product).await? {
            return Ok(record);
        }

        let current = self
            .store
            .find_product(product)
            .await?
            .ok_or_else(|| CommerceError::not_found("product", product))?;

        let mut record = InventoryRecord::open(product, current.stock, None);
        record.low_stock_threshold = self.low_stock_threshold;
        self.store.insert_record_if_absent(record).await
    }

    /// Set a product's quantity to an absolute value, recording the delta.
    ///
    /// The delta is computed against the record's current quantity via
    /// read-then-pass: the record itself carries no hidden "previous value"
    /// state. The linked product's stock is synchronized to the same value.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no inventory record exists for the product,
    /// or `InvalidQuantity` if `new_quantity` is negative.
    #[instrument(skip(self), fields(product = %product))]
    pub async fn adjust(
        &self,
        product: ProductId,
        new_quantity: i64,
        reason: &str,
        acting_user: Option<UserId>,
    ) -> Result<InventoryRecord> {
        if new_quantity < 0 {
            return Err(CommerceError::InvalidQuantity(new_quantity));
        }

        let record = self
            .store
            .find_record(product)
            .await?
            .ok_or_else(|| CommerceError::not_found("inventory record", product))?;

        let delta = new_quantity - record.quantity;
        let entry = StockChange {
            date: Utc::now(),
            quantity: new_quantity,
            change: delta,
            reason: reason.to_string(),
            user: acting_user,
        };

        self.store.append_change(product, entry).await?;
        self.store.set_stock(product, new_quantity).await?;

        tracing::debug!(%product, new_quantity, delta, "inventory adjusted");

        self.store
            .find_record(product)
            .await?
            .ok_or_else(|| CommerceError::not_found("inventory record", product))
    }

    /// Deduct units for a sale. The stock check, the decrement, and the
    /// history append are one atomic store step, so concurrent orders can
    /// neither drive stock negative nor interleave history entries.
    ///
    /// Returns the remaining quantity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a non-positive amount, `NotFound` if
    /// the product does not exist, or `InsufficientStock` when fewer than
    /// `amount` units remain.
    #[instrument(skip(self), fields(product = %product))]
    pub async fn deduct(
        &self,
        product: ProductId,
        amount: i64,
        reason: &str,
        acting_user: Option<UserId>,
    ) -> Result<i64> {
        if amount <= 0 {
            return Err(CommerceError::InvalidQuantity(amount));
        }

        self.track(product).await?;

        let remaining = self
            .store
            .deduct_stock(product, amount, reason, acting_user)
            .await?;

        tracing::debug!(%product, amount, remaining, "stock deducted");
        Ok(remaining)
    }

    /// Current quantity and full history for a product, oldest entry first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no inventory record exists for the product.
    pub async fn query(&self, product: ProductId) -> Result<InventoryRecord> {
        self.store
            .find_record(product)
            .await?
            .ok_or_else(|| CommerceError::not_found("inventory record", product))
    }

    /// Records at or below their low-stock threshold, ascending by quantity.
    ///
    /// With `None` each record is judged against its own
    /// `low_stock_threshold`; `Some` overrides the threshold uniformly.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_low_stock(&self, threshold: Option<i64>) -> Result<Vec<InventoryRecord>> {
        let mut records: Vec<InventoryRecord> = self
            .store
            .list_records()
            .await?
            .into_iter()
            .filter(|record| record.quantity <= threshold.unwrap_or(record.low_stock_threshold))
            .collect();
        records.sort_by_key(|record| record.quantity);
        Ok(records)
    }

    /// Re-derive the quantity from the history and repair any divergence in
    /// both the record and the product's denormalized stock.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no inventory record exists for the product.
    #[instrument(skip(self), fields(product = %product))]
    pub async fn reconcile(&self, product: ProductId) -> Result<ReconcileReport> {
        let record = self
            .store
            .find_record(product)
            .await?
            .ok_or_else(|| CommerceError::not_found("inventory record", product))?;

        let derived = record.derived_quantity();
        let recorded = record.quantity;

        if derived == recorded {
            // Still force the product's denormalized count back in line.
            self.store.set_stock(product, recorded).await?;
            return Ok(ReconcileReport {
                product,
                recorded_quantity: recorded,
                derived_quantity: derived,
                corrected: false,
            });
        }

        tracing::warn!(
            %product,
            recorded,
            derived,
            "inventory divergence detected, rewriting from history"
        );

        let mut repaired = record;
        repaired.quantity = derived;
        repaired.last_updated = Utc::now();
        self.store.upsert_record(repaired).await?;
        self.store.set_stock(product, derived).await?;

        Ok(ReconcileReport {
            product,
            recorded_quantity: recorded,
            derived_quantity: derived,
            corrected: true,
        })
    }
}
