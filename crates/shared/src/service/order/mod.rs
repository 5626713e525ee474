mod command;
mod query;

use self::command::OrderCommandService;
use self::query::OrderQueryService;
use crate::abstract_trait::{
    DynOrderCommandService, DynOrderQueryRepository, DynOrderQueryService, DynTransactionRunner,
};
use prometheus_client::registry::Registry;
use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct OrderService {
    pub query: DynOrderQueryService,
    pub command: DynOrderCommandService,
}

pub struct OrderServiceDeps {
    pub query: DynOrderQueryRepository,
    pub transactions: DynTransactionRunner,
    pub tx_timeout: Duration,
    pub registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for OrderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderService")
            .field("query", &"Arc<dyn OrderQueryServiceTrait>")
            .field("command", &"Arc<dyn OrderCommandServiceTrait>")
            .finish()
    }
}

impl OrderService {
    pub async fn new(deps: OrderServiceDeps) -> Self {
        let OrderServiceDeps {
            query,
            transactions,
            tx_timeout,
            registry,
        } = deps;

        let query_service =
            Arc::new(OrderQueryService::new(query, registry.clone()).await) as DynOrderQueryService;

        let command_service =
            Arc::new(OrderCommandService::new(transactions, tx_timeout, registry).await)
                as DynOrderCommandService;

        Self {
            query: query_service,
            command: command_service,
        }
    }
}
