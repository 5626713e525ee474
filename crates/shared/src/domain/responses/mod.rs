mod auth;
mod health;
mod list;
mod order;
mod product;

pub use self::auth::{AuthResponse, UserResponse};
pub use self::health::HealthResponse;
pub use self::list::ListResponse;
pub use self::order::{OrderItemResponse, OrderResponse};
pub use self::product::ProductResponse;
