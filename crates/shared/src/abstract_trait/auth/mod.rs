use crate::{
    domain::{
        requests::{LoginRequest, RegisterRequest},
        responses::AuthResponse,
    },
    errors::ServiceError,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynAuthService = Arc<dyn AuthServiceTrait + Send + Sync>;

#[async_trait]
pub trait AuthServiceTrait {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ServiceError>;
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ServiceError>;
    /// Creates the bootstrap admin account unless a user with that email exists.
    async fn ensure_admin_exists(&self, email: &str, password: &str) -> Result<(), ServiceError>;
}
