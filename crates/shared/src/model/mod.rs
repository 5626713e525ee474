mod order;
mod order_item;
mod product;
mod user;

pub use self::order::{Order, OrderDetails, OrderLineDetails};
pub use self::order_item::OrderItem;
pub use self::product::Product;
pub use self::user::User;
