mod auth;
mod order;
mod product;
mod transaction;

pub use self::auth::{AuthService, AuthServiceDeps};
pub use self::order::{OrderService, OrderServiceDeps};
pub use self::product::{ProductService, ProductServiceDeps};
pub use self::transaction::with_transaction;
