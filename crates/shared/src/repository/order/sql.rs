//! Order reads shared by the pooled query repository and the transactional
//! unit of work. Everything takes a bare connection so it runs the same
//! inside or outside a transaction.

use crate::{
    errors::RepositoryError,
    model::{Order, OrderDetails, OrderItem, OrderLineDetails, Product},
};
use sqlx::PgConnection;
use std::collections::HashMap;
use uuid::Uuid;

pub(crate) async fn find_orders_by_user(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<Order>, RepositoryError> {
    let orders = sqlx::query_as::<_, Order>(
        r#"
        SELECT id, user_id, total_cents, currency, created_at
        FROM orders
        WHERE user_id = $1
        ORDER BY created_at DESC, seq DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(orders)
}

pub(crate) async fn find_order_by_id(
    conn: &mut PgConnection,
    order_id: Uuid,
) -> Result<Option<Order>, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
        SELECT id, user_id, total_cents, currency, created_at
        FROM orders
        WHERE id = $1
        "#,
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(order)
}

/// Loads the lines of `orders` and the products they reference, keeping the
/// order of `orders` and putting each order's lines in line order.
pub(crate) async fn attach_lines(
    conn: &mut PgConnection,
    orders: Vec<Order>,
) -> Result<Vec<OrderDetails>, RepositoryError> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let items = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT id, order_id, line_no, product_id, quantity, unit_price_cents
        FROM order_items
        WHERE order_id = ANY($1)
        ORDER BY order_id, line_no
        "#,
    )
    .bind(&order_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();

    let products: HashMap<Uuid, Product> = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, description, price_cents, currency, stock, active, created_at, updated_at
        FROM products
        WHERE id = ANY($1)
        "#,
    )
    .bind(&product_ids)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|p| (p.id, p))
    .collect();

    let mut lines_by_order: HashMap<Uuid, Vec<OrderLineDetails>> = HashMap::new();
    for item in items {
        let product = products.get(&item.product_id).cloned().ok_or_else(|| {
            RepositoryError::Custom(format!(
                "order item {} references missing product {}",
                item.id, item.product_id
            ))
        })?;
        lines_by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderLineDetails { item, product });
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let lines = lines_by_order.remove(&order.id).unwrap_or_default();
            OrderDetails { order, lines }
        })
        .collect())
}
