use super::order::sql;
use crate::{
    abstract_trait::{TransactionRunnerTrait, UnitOfWorkTrait},
    config::ConnectionPool,
    domain::requests::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
    errors::RepositoryError,
    model::{Order, OrderDetails, OrderItem, Product},
};
use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

/// Opens Postgres transactions with server-side time limits matching the
/// client-side budget.
pub struct PgTransactionRunner {
    db: ConnectionPool,
    timeout: Duration,
}

impl PgTransactionRunner {
    pub fn new(db: ConnectionPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }
}

#[async_trait]
impl TransactionRunnerTrait for PgTransactionRunner {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkTrait>, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(|err| {
            error!("❌ Failed to begin transaction: {err:?}");
            RepositoryError::from(err)
        })?;

        // set_config(.., true) is SET LOCAL: the limits end with the transaction
        let ms = self.timeout.as_millis().max(1);
        sqlx::query(
            r#"
            SELECT set_config('statement_timeout', $1, true),
                   set_config('lock_timeout', $1, true),
                   set_config('idle_in_transaction_session_timeout', $1, true)
            "#,
        )
        .bind(ms.to_string())
        .execute(&mut *tx)
        .await?;

        debug!("🔓 Transaction opened with a {ms}ms budget");
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWorkTrait for PgUnitOfWork {
    async fn find_active_products(
        &mut self,
        ids: &[Uuid],
    ) -> Result<Vec<Product>, RepositoryError> {
        // locking in id order keeps concurrent placements from deadlocking
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, currency, stock, active, created_at, updated_at
            FROM products
            WHERE id = ANY($1) AND active = TRUE
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(products)
    }

    async fn decrement_stock(
        &mut self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = stock - $2, updated_at = now()
            WHERE id = $1 AND active = TRUE AND stock >= $2
            RETURNING id, name, description, price_cents, currency, stock, active, created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(product)
    }

    async fn create_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (id, user_id, total_cents, currency)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, total_cents, currency, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.user_id)
        .bind(req.total_cents)
        .bind(&req.currency)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(order)
    }

    async fn create_order_item(
        &mut self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItem, RepositoryError> {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (id, order_id, line_no, product_id, quantity, unit_price_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, order_id, line_no, product_id, quantity, unit_price_cents
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.order_id)
        .bind(req.line_no)
        .bind(req.product_id)
        .bind(req.quantity)
        .bind(req.unit_price_cents)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(item)
    }

    async fn find_order_details(
        &mut self,
        order_id: Uuid,
    ) -> Result<Option<OrderDetails>, RepositoryError> {
        let Some(order) = sql::find_order_by_id(&mut self.tx, order_id).await? else {
            return Ok(None);
        };

        let mut details = sql::attach_lines(&mut self.tx, vec![order]).await?;
        Ok(details.pop())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(RepositoryError::from)
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await.map_err(RepositoryError::from)
    }
}
