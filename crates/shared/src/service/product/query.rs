use crate::{
    abstract_trait::{DynProductQueryRepository, ProductQueryServiceTrait},
    domain::responses::ProductResponse,
    errors::ServiceError,
    utils::{Method, Metrics, TracingContext},
};
use async_trait::async_trait;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info_span;
use uuid::Uuid;

pub struct ProductQueryService {
    query: DynProductQueryRepository,
    metrics: Metrics,
}

impl ProductQueryService {
    pub async fn new(query: DynProductQueryRepository, registry: Arc<Mutex<Registry>>) -> Self {
        let metrics = Metrics::new();
        metrics.register(
            &mut *registry.lock().await,
            "product_query_service",
            "ProductQueryService",
        );

        Self { query, metrics }
    }
}

#[async_trait]
impl ProductQueryServiceTrait for ProductQueryService {
    async fn find_active(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        let tracing_ctx = TracingContext::start(info_span!("find_active_products"), "find_active");

        match self.query.find_active().await {
            Ok(products) => {
                tracing_ctx.complete(
                    &self.metrics,
                    Method::Get,
                    true,
                    &format!("Listed {} products", products.len()),
                );
                Ok(products.into_iter().map(ProductResponse::from).collect())
            }
            Err(e) => {
                tracing_ctx.complete(&self.metrics, Method::Get, false, &e.to_string());
                Err(e.into())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<ProductResponse, ServiceError> {
        let tracing_ctx = TracingContext::start(
            info_span!("find_product", product_id = %id),
            "find_by_id",
        );

        match self.query.find_by_id(id).await {
            Ok(Some(product)) => {
                tracing_ctx.complete(&self.metrics, Method::Get, true, "Product found");
                Ok(product.into())
            }
            Ok(None) => {
                tracing_ctx.complete(&self.metrics, Method::Get, false, "Product not found");
                Err(ServiceError::NotFound("Product not found".to_string()))
            }
            Err(e) => {
                tracing_ctx.complete(&self.metrics, Method::Get, false, &e.to_string());
                Err(e.into())
            }
        }
    }
}
