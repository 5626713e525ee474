use crate::{
    abstract_trait::{
        AuthServiceTrait, DynHashing, DynJwtService, DynUserCommandRepository,
        DynUserQueryRepository,
    },
    domain::{
        identity::Role,
        requests::{CreateUserRecordRequest, LoginRequest, RegisterRequest},
        responses::{AuthResponse, UserResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::User,
    utils::{Method, Metrics, TracingContext},
};
use async_trait::async_trait;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, info_span, warn};

const MIN_ADMIN_PASSWORD_LEN: usize = 8;

pub struct AuthService {
    query: DynUserQueryRepository,
    command: DynUserCommandRepository,
    hash: DynHashing,
    jwt: DynJwtService,
    metrics: Metrics,
}

pub struct AuthServiceDeps {
    pub query: DynUserQueryRepository,
    pub command: DynUserCommandRepository,
    pub hash: DynHashing,
    pub jwt: DynJwtService,
    pub registry: Arc<Mutex<Registry>>,
}

impl AuthService {
    pub async fn new(deps: AuthServiceDeps) -> Self {
        let AuthServiceDeps {
            query,
            command,
            hash,
            jwt,
            registry,
        } = deps;

        let metrics = Metrics::new();
        metrics.register(&mut *registry.lock().await, "auth_service", "AuthService");

        Self {
            query,
            command,
            hash,
            jwt,
            metrics,
        }
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, ServiceError> {
        let password_hash = self.hash.hash_password(password).await?;

        let req = CreateUserRecordRequest {
            email: email.to_string(),
            password_hash,
            role,
        };

        // a concurrent registration can still win the unique index
        self.command.create_user(&req).await.map_err(|e| match e {
            RepositoryError::AlreadyExists(_) => {
                ServiceError::Conflict("Email already in use".to_string())
            }
            other => ServiceError::Repo(other),
        })
    }

    fn issue(&self, user: User) -> Result<AuthResponse, ServiceError> {
        let token = self.jwt.generate_token(&user)?;
        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }

    async fn register_inner(&self, req: &RegisterRequest) -> Result<AuthResponse, ServiceError> {
        if self.query.find_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already in use".to_string()));
        }

        let user = self.create_user(&req.email, &req.password, Role::User).await?;
        self.issue(user)
    }

    async fn login_inner(&self, req: &LoginRequest) -> Result<AuthResponse, ServiceError> {
        let user = self
            .query
            .find_by_email(&req.email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        self.hash
            .verify_password(&user.password_hash, &req.password)
            .await?;

        self.issue(user)
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ServiceError> {
        let tracing_ctx = TracingContext::start(info_span!("register"), "register");

        let result = self.register_inner(req).await;
        match &result {
            Ok(res) => tracing_ctx.complete(
                &self.metrics,
                Method::Post,
                true,
                &format!("Registered user {}", res.user.id),
            ),
            Err(e) => tracing_ctx.complete(&self.metrics, Method::Post, false, &e.to_string()),
        }
        result
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ServiceError> {
        let tracing_ctx = TracingContext::start(info_span!("login"), "login");

        let result = self.login_inner(req).await;
        match &result {
            Ok(res) => tracing_ctx.complete(
                &self.metrics,
                Method::Post,
                true,
                &format!("User {} logged in", res.user.id),
            ),
            Err(e) => tracing_ctx.complete(&self.metrics, Method::Post, false, &e.to_string()),
        }
        result
    }

    async fn ensure_admin_exists(&self, email: &str, password: &str) -> Result<(), ServiceError> {
        if self.query.find_by_email(email).await?.is_some() {
            info!("👤 Admin account {email} already present");
            return Ok(());
        }

        if password.chars().count() < MIN_ADMIN_PASSWORD_LEN {
            warn!("❌ Refusing to create admin {email}: password too short");
            return Err(ServiceError::InvalidRequest(format!(
                "ADMIN_PASSWORD must be at least {MIN_ADMIN_PASSWORD_LEN} characters"
            )));
        }

        let user = self.create_user(email, password, Role::Admin).await?;
        info!("✅ Created admin account {}", user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::{HashingTrait, JwtServiceTrait},
        config::{Hashing, JwtConfig},
        repository::MemoryStore,
    };
    use std::time::Duration;

    async fn service() -> (AuthService, MemoryStore, DynJwtService) {
        let store = MemoryStore::new();
        let jwt = Arc::new(JwtConfig::new("secret", Duration::from_secs(3600))) as DynJwtService;
        let svc = AuthService::new(AuthServiceDeps {
            query: Arc::new(store.clone()),
            command: Arc::new(store.clone()),
            hash: Arc::new(Hashing::new(4)),
            jwt: jwt.clone(),
            registry: Arc::new(Mutex::new(Registry::default())),
        })
        .await;
        (svc, store, jwt)
    }

    fn register_req(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_issues_a_token_for_a_plain_user() {
        let (svc, _, jwt) = service().await;

        let res = svc
            .register(&register_req("jane@example.com", "password123"))
            .await
            .unwrap();

        assert_eq!(res.user.role, "USER");
        let identity = jwt.verify_token(&res.token).unwrap();
        assert_eq!(identity.id, res.user.id);
        assert_eq!(identity.role, Role::User);
    }

    #[tokio::test]
    async fn register_rejects_a_taken_email() {
        let (svc, _, _) = service().await;
        let req = register_req("jane@example.com", "password123");
        svc.register(&req).await.unwrap();

        let err = svc.register(&req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == "Email already in use"));
    }

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let (svc, store, _) = service().await;
        svc.register(&register_req("jane@example.com", "password123"))
            .await
            .unwrap();

        let user = crate::abstract_trait::UserQueryRepositoryTrait::find_by_email(
            &store,
            "jane@example.com",
        )
        .await
        .unwrap()
        .unwrap();
        assert_ne!(user.password_hash, "password123");
        assert!(
            Hashing::new(4)
                .verify_password(&user.password_hash, "password123")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn login_checks_the_password() {
        let (svc, _, _) = service().await;
        svc.register(&register_req("jane@example.com", "password123"))
            .await
            .unwrap();

        let ok = svc
            .login(&LoginRequest {
                email: "jane@example.com".into(),
                password: "password123".into(),
            })
            .await;
        assert!(ok.is_ok());

        let wrong = svc
            .login(&LoginRequest {
                email: "jane@example.com".into(),
                password: "password124".into(),
            })
            .await;
        assert!(matches!(wrong, Err(ServiceError::InvalidCredentials)));

        let unknown = svc
            .login(&LoginRequest {
                email: "nobody@example.com".into(),
                password: "password123".into(),
            })
            .await;
        assert!(matches!(unknown, Err(ServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn ensure_admin_exists_creates_once() {
        let (svc, _, jwt) = service().await;

        svc.ensure_admin_exists("admin@example.com", "supersecret")
            .await
            .unwrap();
        svc.ensure_admin_exists("admin@example.com", "supersecret")
            .await
            .unwrap();

        let res = svc
            .login(&LoginRequest {
                email: "admin@example.com".into(),
                password: "supersecret".into(),
            })
            .await
            .unwrap();
        assert_eq!(res.user.role, "ADMIN");
        assert!(jwt.verify_token(&res.token).unwrap().is_admin());
    }

    #[tokio::test]
    async fn ensure_admin_exists_rejects_short_password() {
        let (svc, _, _) = service().await;

        let err = svc
            .ensure_admin_exists("admin@example.com", "short")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }
}
