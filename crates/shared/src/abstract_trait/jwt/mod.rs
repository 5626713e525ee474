use crate::{domain::identity::AuthUser, errors::ServiceError, model::User};
use std::sync::Arc;

pub type DynJwtService = Arc<dyn JwtServiceTrait + Send + Sync>;

pub trait JwtServiceTrait: Send + Sync + std::fmt::Debug {
    fn generate_token(&self, user: &User) -> Result<String, ServiceError>;
    fn verify_token(&self, token: &str) -> Result<AuthUser, ServiceError>;
}
