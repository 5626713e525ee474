use crate::{
    abstract_trait::JwtServiceTrait,
    domain::identity::{AuthUser, Role},
    errors::ServiceError,
    model::User,
};
use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtConfig {
    jwt_secret: String,
    expires_in: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("jwt_secret", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(jwt_secret: &str, expires_in: Duration) -> Self {
        JwtConfig {
            jwt_secret: jwt_secret.to_string(),
            expires_in,
        }
    }
}

impl JwtServiceTrait for JwtConfig {
    fn generate_token(&self, user: &User) -> Result<String, ServiceError> {
        let role = user
            .role
            .parse::<Role>()
            .map_err(ServiceError::Internal)?;

        let iat = Utc::now().timestamp() as usize;
        let exp = iat + self.expires_in.as_secs() as usize;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role,
            iat,
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(ServiceError::Jwt)
    }

    fn verify_token(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
                _ => ServiceError::Jwt(e),
            })?;

        let Claims {
            sub, email, role, ..
        } = token_data.claims;

        Ok(AuthUser {
            id: sub,
            email,
            role,
        })
    }
}
