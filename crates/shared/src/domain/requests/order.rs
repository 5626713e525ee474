use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Uuid,

    #[validate(range(min = 1, max = 999, message = "Quantity must be between 1 and 999"))]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderRequest {
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    #[validate(nested)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderRecordRequest {
    pub user_id: Uuid,
    pub total_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct CreateOrderItemRecordRequest {
    pub order_id: Uuid,
    pub line_no: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
}
