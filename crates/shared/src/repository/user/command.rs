use crate::{
    abstract_trait::UserCommandRepositoryTrait, config::ConnectionPool,
    domain::requests::CreateUserRecordRequest, errors::RepositoryError, model::User as UserModel,
};
use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

pub struct UserCommandRepository {
    db: ConnectionPool,
}

impl UserCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserCommandRepositoryTrait for UserCommandRepository {
    async fn create_user(
        &self,
        req: &CreateUserRecordRequest,
    ) -> Result<UserModel, RepositoryError> {
        let user = sqlx::query_as::<_, UserModel>(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, now(), now())
            RETURNING id, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.email)
        .bind(&req.password_hash)
        .bind(req.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to create user: {err:?}");
            RepositoryError::from(err)
        })?;

        info!("✅ Created user {} with role {}", user.id, user.role);
        Ok(user)
    }
}
