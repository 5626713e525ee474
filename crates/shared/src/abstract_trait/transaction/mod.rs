use crate::{
    domain::requests::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
    errors::RepositoryError,
    model::{Order, OrderDetails, OrderItem, Product},
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type DynTransactionRunner = Arc<dyn TransactionRunnerTrait + Send + Sync>;

/// Opens units of work against a store.
#[async_trait]
pub trait TransactionRunnerTrait {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkTrait>, RepositoryError>;
}

/// A single all-or-nothing transaction.
///
/// Writes are only visible to other callers after `commit`. Dropping the unit
/// of work without committing discards everything it did.
#[async_trait]
pub trait UnitOfWorkTrait: Send {
    /// Active products among `ids`, locked until the unit of work ends.
    async fn find_active_products(&mut self, ids: &[Uuid])
    -> Result<Vec<Product>, RepositoryError>;

    /// Subtracts `quantity` from the product's stock if the product is active
    /// and has at least that much left. Returns `None` when the guard fails.
    async fn decrement_stock(
        &mut self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError>;

    async fn create_order(&mut self, req: &CreateOrderRecordRequest)
    -> Result<Order, RepositoryError>;

    async fn create_order_item(
        &mut self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItem, RepositoryError>;

    /// Reads the order back through this unit of work.
    async fn find_order_details(
        &mut self,
        order_id: Uuid,
    ) -> Result<Option<OrderDetails>, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}
