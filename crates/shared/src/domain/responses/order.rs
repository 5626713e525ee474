use super::ProductResponse;
use crate::model::{OrderDetails, OrderLineDetails};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub product: ProductResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_cents: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderLineDetails> for OrderItemResponse {
    fn from(value: OrderLineDetails) -> Self {
        let OrderLineDetails { item, product } = value;
        OrderItemResponse {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            product: product.into(),
        }
    }
}

impl From<OrderDetails> for OrderResponse {
    fn from(value: OrderDetails) -> Self {
        let OrderDetails { order, lines } = value;
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            total_cents: order.total_cents,
            currency: order.currency,
            created_at: order.created_at,
            items: lines.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}
