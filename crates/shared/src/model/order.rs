use super::{OrderItem, Product};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_cents: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// A stored order line together with the product it references.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineDetails {
    pub item: OrderItem,
    pub product: Product,
}

/// An order with its lines in line order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetails {
    pub order: Order,
    pub lines: Vec<OrderLineDetails>,
}
