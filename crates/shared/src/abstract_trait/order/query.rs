use crate::{
    domain::responses::OrderResponse,
    errors::{RepositoryError, ServiceError},
    model::OrderDetails,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;
pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    /// Orders of one user, newest first, each with its lines and their products.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<OrderDetails>, RepositoryError>;
}

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderResponse>, ServiceError>;
}
