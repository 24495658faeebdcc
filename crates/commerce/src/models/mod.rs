//! Domain models persisted by the commerce core.

pub mod coupon;
pub mod inventory;
pub mod order;
pub mod product;

pub use coupon::Coupon;
pub use inventory::{InventoryRecord, StockChange};
pub use order::{Order, OrderItem, OrderLine, PaymentInfo, ShippingInfo};
pub use product::{Product, ProductImage};
