//! Inventory ledger records.
//!
//! One record exists per product. The record carries the current quantity
//! plus an append-only history of every change; the current quantity must
//! always equal the cumulative sum of the history deltas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{ProductId, UserId};

/// Default low-stock threshold when a record does not specify one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// One immutable history entry: what the quantity became, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockChange {
    /// When the change was recorded.
    pub date: DateTime<Utc>,
    /// Resulting quantity after the change.
    pub quantity: i64,
    /// Signed delta applied.
    pub change: i64,
    /// Human-readable reason, e.g. `"order placed"` or `"restock"`.
    pub reason: String,
    /// User who triggered the change, when known.
    pub user: Option<UserId>,
}

/// Per-product inventory record with audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Product this record tracks (1:1).
    pub product: ProductId,
    /// Current quantity. Never negative.
    pub quantity: i64,
    /// Quantity at or below which the product counts as low stock.
    pub low_stock_threshold: i64,
    /// When the quantity last changed.
    pub last_updated: DateTime<Utc>,
    /// Append-only change history, oldest first.
    pub history: Vec<StockChange>,
}

impl InventoryRecord {
    /// Open a record for a product with an opening balance entry, so the
    /// history sums to the current quantity from the very first entry.
    #[must_use]
    pub fn open(product: ProductId, quantity: i64, user: Option<UserId>) -> Self {
        let now = Utc::now();
        Self {
            product,
            quantity,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            last_updated: now,
            history: vec![StockChange {
                date: now,
                quantity,
                change: quantity,
                reason: "opening balance".to_string(),
                user,
            }],
        }
    }

    /// Quantity re-derived from the history deltas.
    ///
    /// Equals [`Self::quantity`] unless something wrote around the ledger;
    /// `InventoryLedger::reconcile` repairs that divergence.
    #[must_use]
    pub fn derived_quantity(&self) -> i64 {
        self.history.iter().map(|entry| entry.change).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_history_sums_to_quantity() {
        let record = InventoryRecord::open(ProductId::generate(), 25, None);
        assert_eq!(record.quantity, 25);
        assert_eq!(record.derived_quantity(), 25);
        assert_eq!(record.history.len(), 1);
        assert_eq!(record.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
    }

    #[test]
    fn test_derived_quantity_tracks_deltas() {
        let mut record = InventoryRecord::open(ProductId::generate(), 10, None);
        record.history.push(StockChange {
            date: Utc::now(),
            quantity: 7,
            change: -3,
            reason: "order placed".to_string(),
            user: None,
        });
        record.quantity = 7;
        assert_eq!(record.derived_quantity(), 7);
    }
}
