//! In-process store backing the same repository and unit-of-work traits as
//! Postgres. A unit of work holds the store lock for its whole lifetime and
//! edits a private copy of the state, so transactions are serialized and
//! either land completely on commit or not at all.

use crate::{
    abstract_trait::{
        OrderQueryRepositoryTrait, ProductCommandRepositoryTrait, ProductQueryRepositoryTrait,
        TransactionRunnerTrait, UnitOfWorkTrait, UserCommandRepositoryTrait,
        UserQueryRepositoryTrait,
    },
    domain::requests::{
        CreateOrderItemRecordRequest, CreateOrderRecordRequest, CreateProductRequest,
        CreateUserRecordRequest, UpdateProductRequest,
    },
    errors::RepositoryError,
    model::{Order, OrderDetails, OrderItem, OrderLineDetails, Product, User},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{cmp::Reverse, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: Vec<User>,
    products: Vec<Product>,
    // insertion order doubles as the tie-breaker for equal timestamps
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
}

impl MemoryState {
    fn product_mut(&mut self, id: Uuid) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    fn details(&self, order: &Order) -> Result<OrderDetails, RepositoryError> {
        let mut items: Vec<&OrderItem> = self
            .order_items
            .iter()
            .filter(|item| item.order_id == order.id)
            .collect();
        items.sort_by_key(|item| item.line_no);

        let lines = items
            .into_iter()
            .map(|item| {
                let product = self
                    .products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::Custom(format!(
                            "order item {} references missing product {}",
                            item.id, item.product_id
                        ))
                    })?;
                Ok(OrderLineDetails {
                    item: item.clone(),
                    product,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(OrderDetails {
            order: order.clone(),
            lines,
        })
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an active product and returns it.
    pub async fn seed_product(
        &self,
        name: &str,
        price_cents: i64,
        currency: &str,
        stock: i32,
    ) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price_cents,
            currency: currency.to_string(),
            stock,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.products.push(product.clone());
        product
    }

    pub async fn product(&self, id: Uuid) -> Option<Product> {
        self.state
            .lock()
            .await
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    pub async fn order_item_count(&self) -> usize {
        self.state.lock().await.order_items.len()
    }
}

#[async_trait]
impl UserQueryRepositoryTrait for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl UserCommandRepositoryTrait for MemoryStore {
    async fn create_user(&self, req: &CreateUserRecordRequest) -> Result<User, RepositoryError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == req.email) {
            return Err(RepositoryError::AlreadyExists(format!(
                "user with email {} already exists",
                req.email
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: req.email.clone(),
            password_hash: req.password_hash.clone(),
            role: req.role.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for MemoryStore {
    async fn find_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().await;
        let mut products: Vec<(usize, Product)> = state
            .products
            .iter()
            .cloned()
            .enumerate()
            .filter(|(_, p)| p.active)
            .collect();
        products.sort_by_key(|(idx, p)| (Reverse(p.created_at), Reverse(*idx)));
        Ok(products.into_iter().map(|(_, p)| p).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for MemoryStore {
    async fn create_product(&self, req: &CreateProductRequest) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            description: req.description.clone(),
            price_cents: req.price_cents,
            currency: req.currency.clone(),
            stock: req.stock,
            active: req.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        req: &UpdateProductRequest,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut state = self.state.lock().await;
        let Some(product) = state.product_mut(id) else {
            return Ok(None);
        };

        if let Some(name) = &req.name {
            product.name = name.clone();
        }
        if let Some(description) = &req.description {
            product.description = description.clone();
        }
        if let Some(price_cents) = req.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(currency) = &req.currency {
            product.currency = currency.clone();
        }
        if let Some(stock) = req.stock {
            product.stock = stock;
        }
        if let Some(active) = req.active {
            product.active = active;
        }
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn deactivate_product(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state.product_mut(id).map(|product| {
            product.active = false;
            product.updated_at = Utc::now();
            product.clone()
        }))
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for MemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<OrderDetails>, RepositoryError> {
        let state = self.state.lock().await;
        let mut orders: Vec<(usize, &Order)> = state
            .orders
            .iter()
            .enumerate()
            .filter(|(_, o)| o.user_id == user_id)
            .collect();
        orders.sort_by_key(|(idx, o)| (Reverse(o.created_at), Reverse(*idx)));

        orders
            .into_iter()
            .map(|(_, order)| state.details(order))
            .collect()
    }
}

#[async_trait]
impl TransactionRunnerTrait for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkTrait>, RepositoryError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, staged }))
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl UnitOfWorkTrait for MemoryUnitOfWork {
    async fn find_active_products(
        &mut self,
        ids: &[Uuid],
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .staged
            .products
            .iter()
            .filter(|p| p.active && ids.contains(&p.id))
            .cloned()
            .collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn decrement_stock(
        &mut self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .staged
            .product_mut(product_id)
            .filter(|p| p.active && p.stock >= quantity)
            .map(|p| {
                p.stock -= quantity;
                p.updated_at = Utc::now();
                p.clone()
            }))
    }

    async fn create_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<Order, RepositoryError> {
        if !self.staged.users.iter().any(|u| u.id == req.user_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "user {} does not exist",
                req.user_id
            )));
        }

        let order = Order {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            total_cents: req.total_cents,
            currency: req.currency.clone(),
            created_at: Utc::now(),
        };
        self.staged.orders.push(order.clone());
        Ok(order)
    }

    async fn create_order_item(
        &mut self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItem, RepositoryError> {
        let duplicate_line = self
            .staged
            .order_items
            .iter()
            .any(|i| i.order_id == req.order_id && i.line_no == req.line_no);
        if duplicate_line {
            return Err(RepositoryError::AlreadyExists(format!(
                "order {} already has line {}",
                req.order_id, req.line_no
            )));
        }

        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id: req.order_id,
            line_no: req.line_no,
            product_id: req.product_id,
            quantity: req.quantity,
            unit_price_cents: req.unit_price_cents,
        };
        self.staged.order_items.push(item.clone());
        Ok(item)
    }

    async fn find_order_details(
        &mut self,
        order_id: Uuid,
    ) -> Result<Option<OrderDetails>, RepositoryError> {
        self.staged
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|order| self.staged.details(order))
            .transpose()
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uncommitted_work_is_discarded() {
        let store = MemoryStore::new();
        let product = store.seed_product("Mug", 500, "USD", 10).await;

        let mut uow = store.begin().await.unwrap();
        uow.decrement_stock(product.id, 4).await.unwrap();
        uow.rollback().await.unwrap();

        assert_eq!(store.product(product.id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn dropped_work_is_discarded() {
        let store = MemoryStore::new();
        let product = store.seed_product("Mug", 500, "USD", 10).await;

        {
            let mut uow = store.begin().await.unwrap();
            uow.decrement_stock(product.id, 4).await.unwrap();
        }

        assert_eq!(store.product(product.id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn committed_work_is_visible() {
        let store = MemoryStore::new();
        let product = store.seed_product("Mug", 500, "USD", 10).await;

        let mut uow = store.begin().await.unwrap();
        let updated = uow.decrement_stock(product.id, 4).await.unwrap();
        assert_eq!(updated.map(|p| p.stock), Some(6));
        uow.commit().await.unwrap();

        assert_eq!(store.product(product.id).await.unwrap().stock, 6);
    }

    #[tokio::test]
    async fn decrement_refuses_to_go_negative() {
        let store = MemoryStore::new();
        let product = store.seed_product("Mug", 500, "USD", 3).await;

        let mut uow = store.begin().await.unwrap();
        assert!(uow.decrement_stock(product.id, 4).await.unwrap().is_none());
        assert!(uow.decrement_stock(product.id, 3).await.unwrap().is_some());
        assert!(uow.decrement_stock(product.id, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_active_products_skips_inactive_and_unknown_ids() {
        let store = MemoryStore::new();
        let active = store.seed_product("A", 100, "USD", 1).await;
        let inactive = store.seed_product("B", 100, "USD", 1).await;
        store.deactivate_product(inactive.id).await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let found = uow
            .find_active_products(&[active.id, inactive.id, Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, active.id);
    }
}
