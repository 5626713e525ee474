//! Postgres unit-of-work behaviour. Needs a reachable server:
//! `DATABASE_URL=postgres://… cargo test -p shared --test pg_unit_of_work -- --ignored`

use shared::{
    abstract_trait::{
        OrderQueryRepositoryTrait, ProductCommandRepositoryTrait, ProductQueryRepositoryTrait,
        TransactionRunnerTrait, UserCommandRepositoryTrait,
    },
    domain::{
        identity::Role,
        requests::{
            CreateOrderItemRecordRequest, CreateOrderRecordRequest, CreateProductRequest,
            CreateUserRecordRequest,
        },
    },
    errors::RepositoryError,
    model::Product,
    repository::{OrderRepository, PgTransactionRunner, ProductRepository, UserRepository},
};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

async fn seed_product(pool: &PgPool, name: &str, stock: i32) -> Product {
    ProductRepository::new(pool.clone())
        .command
        .create_product(&CreateProductRequest {
            name: name.to_string(),
            description: None,
            price_cents: 250,
            currency: "USD".to_string(),
            stock,
            active: Some(true),
        })
        .await
        .unwrap()
}

async fn seed_user(pool: &PgPool) -> Uuid {
    UserRepository::new(pool.clone())
        .command
        .create_user(&CreateUserRecordRequest {
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: "hash".to_string(),
            role: Role::User,
        })
        .await
        .unwrap()
        .id
}

async fn stock_of(pool: &PgPool, id: Uuid) -> i32 {
    ProductRepository::new(pool.clone())
        .query
        .find_by_id(id)
        .await
        .unwrap()
        .unwrap()
        .stock
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres"]
async fn guarded_decrement_refuses_to_go_negative(pool: PgPool) {
    let product = seed_product(&pool, "Widget", 3).await;
    let runner = PgTransactionRunner::new(pool.clone(), Duration::from_secs(5));

    let mut uow = runner.begin().await.unwrap();
    let after = uow.decrement_stock(product.id, 2).await.unwrap();
    assert_eq!(after.map(|p| p.stock), Some(1));
    assert!(uow.decrement_stock(product.id, 2).await.unwrap().is_none());
    uow.commit().await.unwrap();

    assert_eq!(stock_of(&pool, product.id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres"]
async fn rollback_discards_every_write(pool: PgPool) {
    let product = seed_product(&pool, "Widget", 5).await;
    let user_id = seed_user(&pool).await;
    let runner = PgTransactionRunner::new(pool.clone(), Duration::from_secs(5));

    let mut uow = runner.begin().await.unwrap();
    uow.decrement_stock(product.id, 4).await.unwrap();
    uow.create_order(&CreateOrderRecordRequest {
        user_id,
        total_cents: 1000,
        currency: "USD".to_string(),
    })
    .await
    .unwrap();
    uow.rollback().await.unwrap();

    assert_eq!(stock_of(&pool, product.id).await, 5);
    let orders = OrderRepository::new(pool.clone())
        .query
        .find_by_user(user_id)
        .await
        .unwrap();
    assert!(orders.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres"]
async fn committed_order_reads_back_with_lines(pool: PgPool) {
    let widget = seed_product(&pool, "Widget", 5).await;
    let gadget = seed_product(&pool, "Gadget", 5).await;
    let user_id = seed_user(&pool).await;
    let runner = PgTransactionRunner::new(pool.clone(), Duration::from_secs(5));

    let mut uow = runner.begin().await.unwrap();
    let locked = uow
        .find_active_products(&[gadget.id, widget.id])
        .await
        .unwrap();
    let mut ids: Vec<Uuid> = vec![widget.id, gadget.id];
    ids.sort();
    assert_eq!(locked.iter().map(|p| p.id).collect::<Vec<_>>(), ids);

    let order = uow
        .create_order(&CreateOrderRecordRequest {
            user_id,
            total_cents: 500,
            currency: "USD".to_string(),
        })
        .await
        .unwrap();
    for (line_no, product) in [(1, &widget), (2, &gadget)] {
        uow.decrement_stock(product.id, 1).await.unwrap();
        uow.create_order_item(&CreateOrderItemRecordRequest {
            order_id: order.id,
            line_no,
            product_id: product.id,
            quantity: 1,
            unit_price_cents: product.price_cents,
        })
        .await
        .unwrap();
    }

    let details = uow.find_order_details(order.id).await.unwrap().unwrap();
    assert_eq!(details.lines.len(), 2);
    assert_eq!(details.lines[0].item.product_id, widget.id);
    assert_eq!(details.lines[0].product.stock, 4);
    uow.commit().await.unwrap();

    let history = OrderRepository::new(pool.clone())
        .query
        .find_by_user(user_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].order.id, order.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at Postgres"]
async fn lock_wait_beyond_the_budget_fails_fast(pool: PgPool) {
    let product = seed_product(&pool, "Widget", 5).await;
    let holder = PgTransactionRunner::new(pool.clone(), Duration::from_secs(5));
    let waiter = PgTransactionRunner::new(pool.clone(), Duration::from_millis(100));

    let mut first = holder.begin().await.unwrap();
    first.find_active_products(&[product.id]).await.unwrap();

    let mut second = waiter.begin().await.unwrap();
    let err = second
        .find_active_products(&[product.id])
        .await
        .unwrap_err();
    // lock_timeout and statement_timeout share the budget; either may fire
    assert!(
        matches!(err, RepositoryError::Conflict(_) | RepositoryError::Timeout),
        "{err:?}"
    );

    second.rollback().await.unwrap();
    first.rollback().await.unwrap();
}
