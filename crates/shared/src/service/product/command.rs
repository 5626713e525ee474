use crate::{
    abstract_trait::{DynProductCommandRepository, ProductCommandServiceTrait},
    domain::{
        requests::{CreateProductRequest, UpdateProductRequest},
        responses::ProductResponse,
    },
    errors::ServiceError,
    model::Product,
    utils::{Method, Metrics, TracingContext},
};
use async_trait::async_trait;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info_span;
use uuid::Uuid;

pub struct ProductCommandService {
    command: DynProductCommandRepository,
    metrics: Metrics,
}

impl ProductCommandService {
    pub async fn new(command: DynProductCommandRepository, registry: Arc<Mutex<Registry>>) -> Self {
        let metrics = Metrics::new();
        metrics.register(
            &mut *registry.lock().await,
            "product_command_service",
            "ProductCommandService",
        );

        Self { command, metrics }
    }

    fn finish(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        result: Result<Option<Product>, ServiceError>,
        success_message: &str,
    ) -> Result<Product, ServiceError> {
        match result {
            Ok(Some(product)) => {
                tracing_ctx.complete(&self.metrics, method, true, success_message);
                Ok(product)
            }
            Ok(None) => {
                tracing_ctx.complete(&self.metrics, method, false, "Product not found");
                Err(ServiceError::NotFound("Product not found".to_string()))
            }
            Err(e) => {
                tracing_ctx.complete(&self.metrics, method, false, &e.to_string());
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ProductCommandServiceTrait for ProductCommandService {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        let tracing_ctx = TracingContext::start(
            info_span!("create_product", name = %req.name),
            "create_product",
        );

        let result = self
            .command
            .create_product(req)
            .await
            .map(Some)
            .map_err(ServiceError::from);

        self.finish(&tracing_ctx, Method::Post, result, "Product created")
            .map(ProductResponse::from)
    }

    async fn update_product(
        &self,
        id: Uuid,
        req: &UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        let tracing_ctx = TracingContext::start(
            info_span!("update_product", product_id = %id),
            "update_product",
        );

        let result = self
            .command
            .update_product(id, req)
            .await
            .map_err(ServiceError::from);

        self.finish(&tracing_ctx, Method::Put, result, "Product updated")
            .map(ProductResponse::from)
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let tracing_ctx = TracingContext::start(
            info_span!("delete_product", product_id = %id),
            "delete_product",
        );

        let result = self
            .command
            .deactivate_product(id)
            .await
            .map_err(ServiceError::from);

        self.finish(&tracing_ctx, Method::Delete, result, "Product deactivated")
            .map(|_| ())
    }
}
