mod auth;
mod order;
mod product;

pub use self::auth::{CreateUserRecordRequest, LoginRequest, RegisterRequest};
pub use self::order::{
    CreateOrderItemRecordRequest, CreateOrderRecordRequest, OrderItemRequest, PlaceOrderRequest,
};
pub use self::product::{CreateProductRequest, UpdateProductRequest};
