use crate::{
    abstract_trait::ProductCommandRepositoryTrait,
    config::ConnectionPool,
    domain::requests::{CreateProductRequest, UpdateProductRequest},
    errors::RepositoryError,
    model::Product as ProductModel,
};
use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

pub struct ProductCommandRepository {
    db: ConnectionPool,
}

impl ProductCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for ProductCommandRepository {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let product = sqlx::query_as::<_, ProductModel>(
            r#"
            INSERT INTO products (id, name, description, price_cents, currency, stock, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
            RETURNING id, name, description, price_cents, currency, stock, active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.price_cents)
        .bind(&req.currency)
        .bind(req.stock)
        .bind(req.active.unwrap_or(true))
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to create product '{}': {err:?}", req.name);
            RepositoryError::from(err)
        })?;

        info!("✅ Created product {} ({})", product.id, product.name);
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        req: &UpdateProductRequest,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        // $3 tells apart "leave description alone" from "set it to $4 (possibly NULL)"
        let product = sqlx::query_as::<_, ProductModel>(
            r#"
            UPDATE products
            SET name        = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                price_cents = COALESCE($5, price_cents),
                currency    = COALESCE($6, currency),
                stock       = COALESCE($7, stock),
                active      = COALESCE($8, active),
                updated_at  = now()
            WHERE id = $1
            RETURNING id, name, description, price_cents, currency, stock, active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(req.description.is_some())
        .bind(req.description.clone().flatten())
        .bind(req.price_cents)
        .bind(&req.currency)
        .bind(req.stock)
        .bind(req.active)
        .fetch_optional(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to update product {id}: {err:?}");
            RepositoryError::from(err)
        })?;

        if product.is_some() {
            info!("✅ Updated product {id}");
        }
        Ok(product)
    }

    async fn deactivate_product(&self, id: Uuid) -> Result<Option<ProductModel>, RepositoryError> {
        let product = sqlx::query_as::<_, ProductModel>(
            r#"
            UPDATE products
            SET active = FALSE, updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, price_cents, currency, stock, active, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to deactivate product {id}: {err:?}");
            RepositoryError::from(err)
        })?;

        if product.is_some() {
            info!("🗑️ Deactivated product {id}");
        }
        Ok(product)
    }
}
