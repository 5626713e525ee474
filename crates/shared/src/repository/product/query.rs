use crate::{
    abstract_trait::ProductQueryRepositoryTrait, config::ConnectionPool, errors::RepositoryError,
    model::Product as ProductModel,
};
use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

pub struct ProductQueryRepository {
    db: ConnectionPool,
}

impl ProductQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for ProductQueryRepository {
    async fn find_active(&self) -> Result<Vec<ProductModel>, RepositoryError> {
        let products = sqlx::query_as::<_, ProductModel>(
            r#"
            SELECT id, name, description, price_cents, currency, stock, active, created_at, updated_at
            FROM products
            WHERE active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch active products: {err:?}");
            RepositoryError::from(err)
        })?;

        info!("✅ Found {} active products", products.len());
        Ok(products)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>, RepositoryError> {
        sqlx::query_as::<_, ProductModel>(
            r#"
            SELECT id, name, description, price_cents, currency, stock, active, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch product {id}: {err:?}");
            RepositoryError::from(err)
        })
    }
}
