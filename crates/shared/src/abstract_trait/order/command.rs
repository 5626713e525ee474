use crate::{
    domain::{requests::PlaceOrderRequest, responses::OrderResponse},
    errors::ServiceError,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;

// Order writes go through a unit of work (see `UnitOfWorkTrait`), so there is
// no standalone command repository.
#[async_trait]
pub trait OrderCommandServiceTrait {
    async fn place_order(
        &self,
        user_id: Uuid,
        req: &PlaceOrderRequest,
    ) -> Result<OrderResponse, ServiceError>;
}
