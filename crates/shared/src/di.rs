use crate::{
    abstract_trait::{
        DynAuthService, DynHashing, DynJwtService, DynOrderQueryRepository,
        DynProductCommandRepository, DynProductQueryRepository, DynTransactionRunner,
        DynUserCommandRepository, DynUserQueryRepository,
    },
    config::ConnectionPool,
    repository::{
        MemoryStore, OrderRepository, PgTransactionRunner, ProductRepository, UserRepository,
    },
    service::{
        AuthService, AuthServiceDeps, OrderService, OrderServiceDeps, ProductService,
        ProductServiceDeps,
    },
};
use prometheus_client::registry::Registry;
use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Every store handle the services need, from one backend.
#[derive(Clone)]
pub struct Repositories {
    pub user_query: DynUserQueryRepository,
    pub user_command: DynUserCommandRepository,
    pub product_query: DynProductQueryRepository,
    pub product_command: DynProductCommandRepository,
    pub order_query: DynOrderQueryRepository,
    pub transactions: DynTransactionRunner,
}

impl Repositories {
    pub fn postgres(pool: ConnectionPool, tx_timeout: Duration) -> Self {
        let user = UserRepository::new(pool.clone());
        let product = ProductRepository::new(pool.clone());
        let order = OrderRepository::new(pool.clone());
        let transactions =
            Arc::new(PgTransactionRunner::new(pool, tx_timeout)) as DynTransactionRunner;

        Self {
            user_query: user.query,
            user_command: user.command,
            product_query: product.query,
            product_command: product.command,
            order_query: order.query,
            transactions,
        }
    }

    pub fn memory(store: &MemoryStore) -> Self {
        let store = Arc::new(store.clone());

        Self {
            user_query: store.clone(),
            user_command: store.clone(),
            product_query: store.clone(),
            product_command: store.clone(),
            order_query: store.clone(),
            transactions: store,
        }
    }
}

#[derive(Clone)]
pub struct DependenciesInject {
    pub auth_service: DynAuthService,
    pub product_service: ProductService,
    pub order_service: OrderService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("auth_service", &"<AuthService>")
            .field("product_service", &self.product_service)
            .field("order_service", &self.order_service)
            .finish()
    }
}

pub struct DependenciesInjectDeps {
    pub repositories: Repositories,
    pub hash: DynHashing,
    pub jwt: DynJwtService,
    pub tx_timeout: Duration,
    pub registry: Arc<Mutex<Registry>>,
}

impl DependenciesInject {
    pub async fn new(deps: DependenciesInjectDeps) -> Self {
        let DependenciesInjectDeps {
            repositories,
            hash,
            jwt,
            tx_timeout,
            registry,
        } = deps;

        let auth_service = Arc::new(
            AuthService::new(AuthServiceDeps {
                query: repositories.user_query.clone(),
                command: repositories.user_command.clone(),
                hash,
                jwt,
                registry: registry.clone(),
            })
            .await,
        ) as DynAuthService;

        let product_service = ProductService::new(ProductServiceDeps {
            query: repositories.product_query.clone(),
            command: repositories.product_command.clone(),
            registry: registry.clone(),
        })
        .await;

        let order_service = OrderService::new(OrderServiceDeps {
            query: repositories.order_query.clone(),
            transactions: repositories.transactions.clone(),
            tx_timeout,
            registry,
        })
        .await;

        Self {
            auth_service,
            product_service,
            order_service,
        }
    }
}
