use crate::{
    abstract_trait::{DynOrderQueryRepository, OrderQueryServiceTrait},
    domain::responses::OrderResponse,
    errors::ServiceError,
    utils::{Method, Metrics, TracingContext},
};
use async_trait::async_trait;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info_span;
use uuid::Uuid;

pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    metrics: Metrics,
}

impl OrderQueryService {
    pub async fn new(query: DynOrderQueryRepository, registry: Arc<Mutex<Registry>>) -> Self {
        let metrics = Metrics::new();
        metrics.register(
            &mut *registry.lock().await,
            "order_query_service",
            "OrderQueryService",
        );

        Self { query, metrics }
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderResponse>, ServiceError> {
        let tracing_ctx =
            TracingContext::start(info_span!("list_orders", user_id = %user_id), "list_orders");

        match self.query.find_by_user(user_id).await {
            Ok(orders) => {
                tracing_ctx.complete(
                    &self.metrics,
                    Method::Get,
                    true,
                    &format!("Listed {} orders", orders.len()),
                );
                Ok(orders.into_iter().map(OrderResponse::from).collect())
            }
            Err(e) => {
                tracing_ctx.complete(&self.metrics, Method::Get, false, &e.to_string());
                Err(e.into())
            }
        }
    }
}
