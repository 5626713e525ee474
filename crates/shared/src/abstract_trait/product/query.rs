use crate::{
    domain::responses::ProductResponse,
    errors::{RepositoryError, ServiceError},
    model::Product as ProductModel,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type DynProductQueryRepository = Arc<dyn ProductQueryRepositoryTrait + Send + Sync>;
pub type DynProductQueryService = Arc<dyn ProductQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait ProductQueryRepositoryTrait {
    /// Active products, newest first.
    async fn find_active(&self) -> Result<Vec<ProductModel>, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>, RepositoryError>;
}

#[async_trait]
pub trait ProductQueryServiceTrait {
    async fn find_active(&self) -> Result<Vec<ProductResponse>, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<ProductResponse, ServiceError>;
}
