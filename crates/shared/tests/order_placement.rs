use shared::{
    abstract_trait::{
        DynHashing, DynJwtService, OrderCommandServiceTrait, OrderQueryServiceTrait,
        ProductCommandServiceTrait, UserCommandRepositoryTrait,
    },
    config::{Hashing, JwtConfig},
    di::{DependenciesInject, DependenciesInjectDeps, Repositories},
    domain::{
        identity::Role,
        requests::{CreateUserRecordRequest, OrderItemRequest, PlaceOrderRequest},
    },
    errors::ServiceError,
    model::Product,
    repository::MemoryStore,
};
use prometheus_client::registry::Registry;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use uuid::Uuid;

struct Harness {
    store: MemoryStore,
    di: DependenciesInject,
    user_id: Uuid,
}

async fn harness() -> Harness {
    let store = MemoryStore::new();
    let di = DependenciesInject::new(DependenciesInjectDeps {
        repositories: Repositories::memory(&store),
        hash: Arc::new(Hashing::new(4)) as DynHashing,
        jwt: Arc::new(JwtConfig::new("secret", Duration::from_secs(60))) as DynJwtService,
        tx_timeout: Duration::from_secs(5),
        registry: Arc::new(Mutex::new(Registry::default())),
    })
    .await;

    let user = store
        .create_user(&CreateUserRecordRequest {
            email: "buyer@example.com".into(),
            password_hash: "hash".into(),
            role: Role::User,
        })
        .await
        .unwrap();

    Harness {
        store,
        di,
        user_id: user.id,
    }
}

fn line(product: &Product, quantity: i32) -> OrderItemRequest {
    OrderItemRequest {
        product_id: product.id,
        quantity,
    }
}

fn order(items: Vec<OrderItemRequest>) -> PlaceOrderRequest {
    PlaceOrderRequest { items }
}

async fn stock(h: &Harness, product: &Product) -> i32 {
    h.store.product(product.id).await.unwrap().stock
}

#[tokio::test]
async fn places_an_order_and_decrements_stock() {
    let h = harness().await;
    let a = h.store.seed_product("A", 500, "USD", 10).await;
    let b = h.store.seed_product("B", 300, "USD", 5).await;

    let placed = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&a, 2), line(&b, 1)]))
        .await
        .unwrap();

    assert_eq!(placed.total_cents, 1300);
    assert_eq!(placed.currency, "USD");
    assert_eq!(placed.user_id, h.user_id);
    assert_eq!(placed.items.len(), 2);

    assert_eq!(placed.items[0].product_id, a.id);
    assert_eq!(placed.items[0].quantity, 2);
    assert_eq!(placed.items[0].unit_price_cents, 500);
    assert_eq!(placed.items[1].product_id, b.id);
    assert_eq!(placed.items[1].unit_price_cents, 300);

    // products are returned as they stand after the decrement
    assert_eq!(placed.items[0].product.stock, 8);
    assert_eq!(placed.items[1].product.stock, 4);

    assert_eq!(stock(&h, &a).await, 8);
    assert_eq!(stock(&h, &b).await, 4);
}

#[tokio::test]
async fn total_matches_the_sum_of_line_totals() {
    let h = harness().await;
    let a = h.store.seed_product("A", 1999, "EUR", 100).await;
    let b = h.store.seed_product("B", 1, "EUR", 100).await;

    let placed = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&a, 3), line(&b, 7), line(&a, 1)]))
        .await
        .unwrap();

    let expected: i64 = placed
        .items
        .iter()
        .map(|i| i.unit_price_cents * i64::from(i.quantity))
        .sum();
    assert_eq!(placed.total_cents, expected);
    assert_eq!(placed.total_cents, 1999 * 4 + 7);
}

#[tokio::test]
async fn insufficient_stock_rejects_without_side_effects() {
    let h = harness().await;
    let a = h.store.seed_product("A", 500, "USD", 10).await;

    let err = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&a, 20)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidRequest(ref msg) if msg.contains("Insufficient stock")));
    assert_eq!(stock(&h, &a).await, 10);
    assert_eq!(h.store.order_count().await, 0);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let h = harness().await;
    let a = h.store.seed_product("A", 500, "USD", 10).await;

    let err = h
        .di
        .order_service
        .command
        .place_order(
            h.user_id,
            &order(vec![
                line(&a, 1),
                OrderItemRequest {
                    product_id: Uuid::new_v4(),
                    quantity: 1,
                },
            ]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(ref msg) if msg == "One or more products not found"));
    assert_eq!(stock(&h, &a).await, 10);
    assert_eq!(h.store.order_count().await, 0);
}

#[tokio::test]
async fn inactive_product_is_not_found() {
    let h = harness().await;
    let a = h.store.seed_product("A", 500, "USD", 10).await;
    h.di.product_service.command.delete_product(a.id).await.unwrap();

    let err = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&a, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn mixed_currencies_are_rejected_without_side_effects() {
    let h = harness().await;
    let c = h.store.seed_product("C", 500, "EUR", 10).await;
    let d = h.store.seed_product("D", 500, "USD", 10).await;

    let err = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&c, 1), line(&d, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidRequest(ref msg) if msg.contains("currency")));
    assert_eq!(stock(&h, &c).await, 10);
    assert_eq!(stock(&h, &d).await, 10);
    assert_eq!(h.store.order_count().await, 0);
}

#[tokio::test]
async fn currency_is_checked_before_stock() {
    let h = harness().await;
    let c = h.store.seed_product("C", 500, "EUR", 10).await;
    let d = h.store.seed_product("D", 500, "USD", 0).await;

    // the first line is short on stock, but the later currency clash wins
    let err = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&d, 1), line(&c, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidRequest(ref msg) if msg.contains("currency")));
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let h = harness().await;

    let err = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidRequest(_)));
}

#[tokio::test]
async fn out_of_range_quantity_is_rejected() {
    let h = harness().await;
    let a = h.store.seed_product("A", 500, "USD", 10).await;

    for quantity in [0, -3, 1000] {
        let err = h
            .di
            .order_service
            .command
            .place_order(h.user_id, &order(vec![line(&a, quantity)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }
    assert_eq!(stock(&h, &a).await, 10);
}

#[tokio::test]
async fn repeated_lines_that_overdraw_together_abort_the_order() {
    let h = harness().await;
    let a = h.store.seed_product("A", 500, "USD", 10).await;

    // each line fits on its own, together they need 12
    let err = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&a, 6), line(&a, 6)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidRequest(ref msg) if msg.contains("Insufficient stock")));
    assert_eq!(stock(&h, &a).await, 10);
    assert_eq!(h.store.order_count().await, 0);
    assert_eq!(h.store.order_item_count().await, 0);
}

#[tokio::test]
async fn repeated_lines_within_stock_are_kept_separate() {
    let h = harness().await;
    let a = h.store.seed_product("A", 500, "USD", 10).await;

    let placed = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&a, 4), line(&a, 6)]))
        .await
        .unwrap();

    assert_eq!(placed.items.len(), 2);
    assert_eq!(placed.items[0].quantity, 4);
    assert_eq!(placed.items[1].quantity, 6);
    assert_eq!(placed.total_cents, 5000);
    assert_eq!(stock(&h, &a).await, 0);
}

#[tokio::test]
async fn overflowing_total_is_rejected() {
    let h = harness().await;
    let a = h.store.seed_product("A", i64::MAX / 2, "USD", 10).await;

    let err = h
        .di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&a, 3)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidRequest(ref msg) if msg.contains("too large")));
    assert_eq!(stock(&h, &a).await, 10);
}

#[tokio::test]
async fn unit_price_is_a_snapshot() {
    let h = harness().await;
    let a = h.store.seed_product("A", 500, "USD", 10).await;

    h.di
        .order_service
        .command
        .place_order(h.user_id, &order(vec![line(&a, 1)]))
        .await
        .unwrap();

    h.di.product_service
        .command
        .update_product(
            a.id,
            &shared::domain::requests::UpdateProductRequest {
                price_cents: Some(900),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let orders = h.di.order_service.query.list_orders(h.user_id).await.unwrap();
    assert_eq!(orders[0].items[0].unit_price_cents, 500);
    assert_eq!(orders[0].items[0].product.price_cents, 900);
    assert_eq!(orders[0].total_cents, 500);
}

#[tokio::test]
async fn history_is_newest_first_and_scoped_to_the_user() {
    let h = harness().await;
    let a = h.store.seed_product("A", 100, "USD", 100).await;

    let mut placed_ids = Vec::new();
    for quantity in 1..=3 {
        let placed = h
            .di
            .order_service
            .command
            .place_order(h.user_id, &order(vec![line(&a, quantity)]))
            .await
            .unwrap();
        placed_ids.push(placed.id);
    }

    let orders = h.di.order_service.query.list_orders(h.user_id).await.unwrap();
    let listed: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    placed_ids.reverse();
    assert_eq!(listed, placed_ids);
    assert!(orders.iter().all(|o| o.items.len() == 1));

    // reads without writes in between are stable
    let again = h.di.order_service.query.list_orders(h.user_id).await.unwrap();
    assert_eq!(again, orders);

    let stranger = h.di.order_service.query.list_orders(Uuid::new_v4()).await.unwrap();
    assert!(stranger.is_empty());
}

#[tokio::test]
async fn concurrent_orders_never_oversell() {
    let h = harness().await;
    let a = h.store.seed_product("A", 100, "USD", 5).await;
    let command = h.di.order_service.command.clone();

    let mut tasks = Vec::new();
    for _ in 0..12 {
        let command = command.clone();
        let req = order(vec![line(&a, 1)]);
        let user_id = h.user_id;
        tasks.push(tokio::spawn(async move {
            command.place_order(user_id, &req).await
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert!(matches!(err, ServiceError::InvalidRequest(_))),
        }
    }

    assert_eq!(succeeded, 5);
    assert_eq!(stock(&h, &a).await, 0);
    assert_eq!(h.store.order_count().await, 5);
}
