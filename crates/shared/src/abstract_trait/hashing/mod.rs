use crate::errors::ServiceError;
use async_trait::async_trait;
use std::sync::Arc;

pub type DynHashing = Arc<dyn HashingTrait + Send + Sync>;

/// Password hashing seam. `verify_password` fails with
/// `ServiceError::InvalidCredentials` on a mismatch.
#[async_trait]
pub trait HashingTrait {
    async fn hash_password(&self, password: &str) -> Result<String, ServiceError>;
    async fn verify_password(&self, password_hash: &str, password: &str)
    -> Result<(), ServiceError>;
}
