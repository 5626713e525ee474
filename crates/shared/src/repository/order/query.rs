use super::sql;
use crate::{
    abstract_trait::OrderQueryRepositoryTrait, config::ConnectionPool, errors::RepositoryError,
    model::OrderDetails,
};
use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<OrderDetails>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let orders = sql::find_orders_by_user(&mut conn, user_id)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch orders of user {user_id}: {err:?}");
                err
            })?;

        let details = sql::attach_lines(&mut conn, orders).await.map_err(|err| {
            error!("❌ Failed to fetch order lines of user {user_id}: {err:?}");
            err
        })?;

        info!("✅ Found {} orders for user {user_id}", details.len());
        Ok(details)
    }
}
