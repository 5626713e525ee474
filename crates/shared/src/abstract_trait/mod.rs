mod auth;
mod hashing;
mod jwt;
mod order;
mod product;
mod transaction;
mod user;

pub use self::auth::{AuthServiceTrait, DynAuthService};
pub use self::hashing::{DynHashing, HashingTrait};
pub use self::jwt::{DynJwtService, JwtServiceTrait};
pub use self::order::{
    DynOrderCommandService, DynOrderQueryRepository, DynOrderQueryService,
    OrderCommandServiceTrait, OrderQueryRepositoryTrait, OrderQueryServiceTrait,
};
pub use self::product::{
    DynProductCommandRepository, DynProductCommandService, DynProductQueryRepository,
    DynProductQueryService, ProductCommandRepositoryTrait, ProductCommandServiceTrait,
    ProductQueryRepositoryTrait, ProductQueryServiceTrait,
};
pub use self::transaction::{DynTransactionRunner, TransactionRunnerTrait, UnitOfWorkTrait};
pub use self::user::{
    DynUserCommandRepository, DynUserQueryRepository, UserCommandRepositoryTrait,
    UserQueryRepositoryTrait,
};
