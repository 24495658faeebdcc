//! Product domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{ProductId, UserId};

/// A product image reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    /// Public URL of the hosted image.
    pub url: String,
}

/// A catalog product.
///
/// `stock` is denormalized from the inventory ledger; all mutations must
/// flow through [`crate::inventory::InventoryLedger`] so the two never
/// diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price. Never negative.
    pub price: Decimal,
    /// Units currently in stock. Never negative.
    pub stock: i64,
    /// Image references, primary first.
    pub images: Vec<ProductImage>,
    /// User who listed the product.
    pub owner: UserId,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// URL of the primary image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }
}
