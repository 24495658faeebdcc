//! In-memory document store.
//!
//! Backs tests and single-node deployments. All collections live behind one
//! mutex, which gives this store a stronger guarantee than the trait
//! contract requires: the ledger's paired writes (history append + product
//! stock sync) are atomic here because each store call runs under the same
//! lock and nothing interleaves between two calls on one thread of control.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use clementine_core::{CouponId, OrderId, ProductId, UserId};

use super::{CouponStore, InventoryStore, OrderStore, ProductStore};
use crate::error::{CommerceError, Result};
use crate::models::{Coupon, InventoryRecord, Order, Product, StockChange};

#[derive(Default)]
struct Collections {
    products: HashMap<ProductId, Product>,
    coupons: HashMap<CouponId, Coupon>,
    orders: HashMap<OrderId, Order>,
    inventory: HashMap<ProductId, InventoryRecord>,
}

/// In-memory implementation of all store traits.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the collections, recovering from a poisoned lock: the data is
    /// plain state with no invariant that a panicked writer could have
    /// half-applied across calls.
    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProductStore for MemoryStore {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn insert_product(&self, product: Product) -> Result<()> {
        self.lock().products.insert(product.id, product);
        Ok(())
    }

    async fn set_stock(&self, id: ProductId, stock: i64) -> Result<()> {
        let mut collections = self.lock();
        let product = collections
            .products
            .get_mut(&id)
            .ok_or_else(|| CommerceError::not_found("product", id))?;
        product.stock = stock;
        Ok(())
    }
}

impl CouponStore for MemoryStore {
    async fn insert_coupon(&self, coupon: Coupon) -> Result<()> {
        self.lock().coupons.insert(coupon.id, coupon);
        Ok(())
    }

    async fn find_valid_by_code(&self, code: &str, now: DateTime<Utc>) -> Result<Option<Coupon>> {
        Ok(self
            .lock()
            .coupons
            .values()
            .find(|coupon| coupon.code == code && coupon.is_valid_at(now))
            .cloned())
    }
}

impl OrderStore for MemoryStore {
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    async fn insert_order(&self, order: Order) -> Result<()> {
        self.lock().orders.insert(order.id, order);
        Ok(())
    }

    async fn update_order(&self, order: Order) -> Result<()> {
        let mut collections = self.lock();
        if !collections.orders.contains_key(&order.id) {
            return Err(CommerceError::not_found("order", order.id));
        }
        collections.orders.insert(order.id, order);
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        self.lock()
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CommerceError::not_found("order", id))
    }

    async fn orders_by_user(&self, user: UserId) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .lock()
            .orders
            .values()
            .filter(|order| order.user == user)
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.created_at);
        Ok(orders)
    }
}

impl InventoryStore for MemoryStore {
    async fn find_record(&self, product: ProductId) -> Result<Option<InventoryRecord>> {
        Ok(self.lock().inventory.get(&product).cloned())
    }

    async fn upsert_record(&self, record: InventoryRecord) -> Result<()> {
        self.lock().inventory.insert(record.product, record);
        Ok(())
    }

    async fn insert_record_if_absent(&self, record: InventoryRecord) -> Result<InventoryRecord> {
        let mut collections = self.lock();
        Ok(collections
            .inventory
            .entry(record.product)
            .or_insert(record)
            .clone())
    }

    async fn deduct_stock(
        &self,
        product: ProductId,
        amount: i64,
        reason: &str,
        acting_user: Option<UserId>,
    ) -> Result<i64> {
        let mut guard = self.lock();
        let collections = &mut *guard;
        let record = collections
            .inventory
            .get_mut(&product)
            .ok_or_else(|| CommerceError::not_found("inventory record", product))?;
        let item = collections
            .products
            .get_mut(&product)
            .ok_or_else(|| CommerceError::not_found("product", product))?;
        if item.stock < amount {
            return Err(CommerceError::InsufficientStock {
                product: item.name.clone(),
                requested: amount,
                available: item.stock,
            });
        }
        item.stock -= amount;
        let entry = StockChange {
            date: Utc::now(),
            quantity: item.stock,
            change: -amount,
            reason: reason.to_string(),
            user: acting_user,
        };
        record.quantity = entry.quantity;
        record.last_updated = entry.date;
        record.history.push(entry);
        Ok(item.stock)
    }

    async fn append_change(&self, product: ProductId, entry: StockChange) -> Result<()> {
        let mut collections = self.lock();
        let record = collections
            .inventory
            .get_mut(&product)
            .ok_or_else(|| CommerceError::not_found("inventory record", product))?;
        record.quantity = entry.quantity;
        record.last_updated = entry.date;
        record.history.push(entry);
        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<InventoryRecord>> {
        Ok(self.lock().inventory.values().cloned().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn product(name: &str, stock: i64) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            price: Decimal::new(999, 2),
            stock,
            images: vec![],
            owner: UserId::generate(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_deduct_stock_is_conditional() {
        let store = MemoryStore::new();
        let product = product("Walnut Board", 3);
        let id = product.id;
        store.insert_product(product).await.unwrap();
        store
            .upsert_record(InventoryRecord::open(id, 3, None))
            .await
            .unwrap();

        assert_eq!(
            store.deduct_stock(id, 2, "order placed", None).await.unwrap(),
            1
        );

        let err = store
            .deduct_stock(id, 2, "order placed", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            }
        ));

        // The failed deduction writes nothing: no stock change, no entry.
        let remaining = store.find_product(id).await.unwrap().unwrap().stock;
        assert_eq!(remaining, 1);
        let record = store.find_record(id).await.unwrap().unwrap();
        assert_eq!(record.quantity, 1);
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.history[1].change, -2);
    }

    #[tokio::test]
    async fn test_deduct_stock_missing_product() {
        let store = MemoryStore::new();
        let err = store
            .deduct_stock(ProductId::generate(), 1, "order placed", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn test_insert_record_if_absent_keeps_existing() {
        let store = MemoryStore::new();
        let product_id = ProductId::generate();
        store
            .upsert_record(InventoryRecord::open(product_id, 5, None))
            .await
            .unwrap();

        let stored = store
            .insert_record_if_absent(InventoryRecord::open(product_id, 0, None))
            .await
            .unwrap();
        assert_eq!(stored.quantity, 5);

        let record = store.find_record(product_id).await.unwrap().unwrap();
        assert_eq!(record.quantity, 5);
        assert_eq!(record.history.len(), 1);
        assert_eq!(record.history[0].change, 5);
    }

    #[tokio::test]
    async fn test_find_valid_by_code_skips_expired() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let expired = Coupon {
            id: CouponId::generate(),
            code: "OLD".to_string(),
            discount: 10,
            min_purchase: Decimal::ZERO,
            max_discount: Decimal::TEN,
            starts_at: now - Duration::days(10),
            expires_at: now - Duration::days(1),
            active: true,
            created_at: now,
        };
        store.insert_coupon(expired).await.unwrap();

        assert!(store.find_valid_by_code("OLD", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_order_requires_existing() {
        let store = MemoryStore::new();
        let missing = OrderId::generate();
        assert_eq!(
            store.delete_order(missing).await.unwrap_err().code(),
            "not_found"
        );
    }

    #[tokio::test]
    async fn test_append_change_moves_quantity() {
        let store = MemoryStore::new();
        let product_id = ProductId::generate();
        store
            .upsert_record(InventoryRecord::open(product_id, 5, None))
            .await
            .unwrap();

        store
            .append_change(
                product_id,
                StockChange {
                    date: Utc::now(),
                    quantity: 2,
                    change: -3,
                    reason: "order placed".to_string(),
                    user: None,
                },
            )
            .await
            .unwrap();

        let record = store.find_record(product_id).await.unwrap().unwrap();
        assert_eq!(record.quantity, 2);
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.derived_quantity(), 2);
    }
}
