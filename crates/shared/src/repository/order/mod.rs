mod query;
pub(crate) mod sql;

use std::sync::Arc;

use self::query::OrderQueryRepository;

use crate::{abstract_trait::DynOrderQueryRepository, config::ConnectionPool};

#[derive(Clone)]
pub struct OrderRepository {
    pub query: DynOrderQueryRepository,
}

impl OrderRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        let query = Arc::new(OrderQueryRepository::new(pool)) as DynOrderQueryRepository;

        Self { query }
    }
}
