mod command;
mod query;

pub use self::command::{DynOrderCommandService, OrderCommandServiceTrait};
pub use self::query::{
    DynOrderQueryRepository, DynOrderQueryService, OrderQueryRepositoryTrait,
    OrderQueryServiceTrait,
};
