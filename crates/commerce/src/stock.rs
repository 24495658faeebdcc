//! All-or-nothing stock validation.
//!
//! Every line of an inbound order is checked against current stock before
//! anything is written: one bad line rejects the whole order with no
//! mutation. The resolved products are returned so the caller can build
//! item snapshots and price the order from server-trusted values.

use crate::db::ProductStore;
use crate::error::{CommerceError, Result};
use crate::models::{OrderLine, Product};

/// A requested line resolved against the catalog.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    /// The product as it exists right now.
    pub product: Product,
    /// Requested quantity.
    pub quantity: i64,
}

/// Resolve and validate every line, failing fast on the first problem.
///
/// # Errors
///
/// - `InvalidQuantity` when a requested quantity is not positive
/// - `NotFound` when a product ID does not resolve
/// - `InsufficientStock` when a line asks for more than is available
pub async fn validate<S: ProductStore>(store: &S, lines: &[OrderLine]) -> Result<Vec<ResolvedLine>> {
    let mut resolved = Vec::with_capacity(lines.len());

    for line in lines {
        if line.quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(line.quantity));
        }

        let product = store
            .find_product(line.product)
            .await?
            .ok_or_else(|| CommerceError::not_found("product", line.product))?;

        if product.stock < line.quantity {
            return Err(CommerceError::InsufficientStock {
                product: product.name,
                requested: line.quantity,
                available: product.stock,
            });
        }

        resolved.push(ResolvedLine {
            product,
            quantity: line.quantity,
        });
    }

    Ok(resolved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clementine_core::{ProductId, UserId};
    use rust_decimal::Decimal;

    use crate::db::MemoryStore;

    async fn seed(store: &MemoryStore, name: &str, stock: i64) -> ProductId {
        let product = Product {
            id: ProductId::generate(),
            name: name.to_string(),
            price: Decimal::new(500, 2),
            stock,
            images: vec![],
            owner: UserId::generate(),
            created_at: Utc::now(),
        };
        let id = product.id;
        store.insert_product(product).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_all_lines_resolve() {
        let store = MemoryStore::new();
        let tea = seed(&store, "Loose Leaf Tea", 10).await;
        let honey = seed(&store, "Raw Honey", 4).await;

        let resolved = validate(
            &store,
            &[
                OrderLine { product: tea, quantity: 2 },
                OrderLine { product: honey, quantity: 4 },
            ],
        )
        .await
        .unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].product.name, "Loose Leaf Tea");
        assert_eq!(resolved[1].quantity, 4);
    }

    #[tokio::test]
    async fn test_unknown_product_rejects_order() {
        let store = MemoryStore::new();
        let tea = seed(&store, "Loose Leaf Tea", 10).await;

        let err = validate(
            &store,
            &[
                OrderLine { product: tea, quantity: 1 },
                OrderLine { product: ProductId::generate(), quantity: 1 },
            ],
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn test_insufficient_stock_carries_details() {
        let store = MemoryStore::new();
        let honey = seed(&store, "Raw Honey", 2).await;

        let err = validate(&store, &[OrderLine { product: honey, quantity: 5 }])
            .await
            .unwrap_err();

        match err {
            CommerceError::InsufficientStock {
                product,
                requested,
                available,
            } => {
                assert_eq!(product, "Raw Honey");
                assert_eq!(requested, 5);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validation_does_not_mutate() {
        let store = MemoryStore::new();
        let tea = seed(&store, "Loose Leaf Tea", 10).await;
        let honey = seed(&store, "Raw Honey", 2).await;

        let _ = validate(
            &store,
            &[
                OrderLine { product: tea, quantity: 3 },
                OrderLine { product: honey, quantity: 5 },
            ],
        )
        .await;

        // First line was fine, but the failing second line must leave both untouched.
        assert_eq!(store.find_product(tea).await.unwrap().unwrap().stock, 10);
        assert_eq!(store.find_product(honey).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let store = MemoryStore::new();
        let tea = seed(&store, "Loose Leaf Tea", 10).await;

        let err = validate(&store, &[OrderLine { product: tea, quantity: 0 }])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_quantity");
    }
}
