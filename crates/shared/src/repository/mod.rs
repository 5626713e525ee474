mod memory;
mod order;
mod product;
mod transaction;
mod user;

pub use self::memory::MemoryStore;
pub use self::order::OrderRepository;
pub use self::product::ProductRepository;
pub use self::transaction::{PgTransactionRunner, PgUnitOfWork};
pub use self::user::UserRepository;
