use crate::{
    abstract_trait::{DynTransactionRunner, OrderCommandServiceTrait, UnitOfWorkTrait},
    domain::{
        requests::{
            CreateOrderItemRecordRequest, CreateOrderRecordRequest, OrderItemRequest,
            PlaceOrderRequest,
        },
        responses::OrderResponse,
    },
    errors::ServiceError,
    model::{OrderDetails, Product},
    service::with_transaction,
    utils::{Method, Metrics, TracingContext},
};
use async_trait::async_trait;
use prometheus_client::registry::Registry;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

const MIN_QUANTITY: i32 = 1;
const MAX_QUANTITY: i32 = 999;

pub struct OrderCommandService {
    transactions: DynTransactionRunner,
    tx_timeout: Duration,
    metrics: Metrics,
}

impl OrderCommandService {
    pub async fn new(
        transactions: DynTransactionRunner,
        tx_timeout: Duration,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(
            &mut *registry.lock().await,
            "order_command_service",
            "OrderCommandService",
        );

        Self {
            transactions,
            tx_timeout,
            metrics,
        }
    }
}

fn insufficient_stock(product_id: Uuid) -> ServiceError {
    ServiceError::InvalidRequest(format!("Insufficient stock for product {product_id}"))
}

fn products_not_found() -> ServiceError {
    ServiceError::NotFound("One or more products not found".to_string())
}

/// Validates the request against the locked product rows and writes the
/// order. Any error aborts the surrounding unit of work.
async fn place_order_in(
    uow: &mut (dyn UnitOfWorkTrait + 'static),
    user_id: Uuid,
    items: &[OrderItemRequest],
) -> Result<OrderDetails, ServiceError> {
    let Some(first) = items.first() else {
        return Err(ServiceError::InvalidRequest(
            "Order must contain at least one item".to_string(),
        ));
    };

    if let Some(line) = items
        .iter()
        .find(|line| !(MIN_QUANTITY..=MAX_QUANTITY).contains(&line.quantity))
    {
        return Err(ServiceError::InvalidRequest(format!(
            "Quantity for product {} must be between {MIN_QUANTITY} and {MAX_QUANTITY}",
            line.product_id
        )));
    }

    // lines are kept separate per product; nothing is merged
    let mut lines_by_product: BTreeMap<Uuid, Vec<&OrderItemRequest>> = BTreeMap::new();
    for line in items {
        lines_by_product.entry(line.product_id).or_default().push(line);
    }
    let product_ids: Vec<Uuid> = lines_by_product.keys().copied().collect();

    let products: HashMap<Uuid, Product> = uow
        .find_active_products(&product_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    if products.len() != product_ids.len() {
        return Err(products_not_found());
    }

    let product_of = |id: Uuid| products.get(&id).ok_or_else(products_not_found);

    let currency = product_of(first.product_id)?.currency.clone();
    for line in items {
        if product_of(line.product_id)?.currency != currency {
            return Err(ServiceError::InvalidRequest(
                "All items must share the same currency".to_string(),
            ));
        }
    }

    for line in items {
        if product_of(line.product_id)?.stock < line.quantity {
            return Err(insufficient_stock(line.product_id));
        }
    }

    let mut total_cents: i64 = 0;
    for line in items {
        total_cents = product_of(line.product_id)?
            .price_cents
            .checked_mul(i64::from(line.quantity))
            .and_then(|line_total| total_cents.checked_add(line_total))
            .ok_or_else(|| ServiceError::InvalidRequest("Order total is too large".to_string()))?;
    }

    // guarded decrements catch repeated lines that together exceed the stock
    for line in items {
        uow.decrement_stock(line.product_id, line.quantity)
            .await?
            .ok_or_else(|| insufficient_stock(line.product_id))?;
    }

    let order = uow
        .create_order(&CreateOrderRecordRequest {
            user_id,
            total_cents,
            currency,
        })
        .await?;

    for (idx, line) in items.iter().enumerate() {
        let line_no = i32::try_from(idx + 1)
            .map_err(|_| ServiceError::InvalidRequest("Too many order lines".to_string()))?;

        uow.create_order_item(&CreateOrderItemRecordRequest {
            order_id: order.id,
            line_no,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price_cents: product_of(line.product_id)?.price_cents,
        })
        .await?;
    }

    debug!(order_id = %order.id, lines = items.len(), "order rows written");

    uow.find_order_details(order.id)
        .await?
        .ok_or_else(|| {
            ServiceError::Internal(format!("order {} not readable after insert", order.id))
        })
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn place_order(
        &self,
        user_id: Uuid,
        req: &PlaceOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let span = info_span!("place_order", user_id = %user_id, lines = req.items.len());
        let tracing_ctx = TracingContext::start(span.clone(), "place_order");

        let items = req.items.clone();
        let result = with_transaction(&self.transactions, self.tx_timeout, move |uow| {
            Box::pin(async move { place_order_in(uow, user_id, &items).await })
        })
        .instrument(span)
        .await;

        match result {
            Ok(details) => {
                tracing_ctx.complete(
                    &self.metrics,
                    Method::Post,
                    true,
                    &format!(
                        "Placed order {} totalling {} {}",
                        details.order.id, details.order.total_cents, details.order.currency
                    ),
                );
                Ok(details.into())
            }
            Err(e) => {
                tracing_ctx.complete(&self.metrics, Method::Post, false, &e.to_string());
                Err(e)
            }
        }
    }
}
