use crate::{abstract_trait::rate_limit::DynRateLimitMiddleware, cache::rate_limit::RateLimiter};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynHashing, DynJwtService},
    config::{Config, CorsConfig, Hashing, JwtConfig},
    di::{DependenciesInject, DependenciesInjectDeps, Repositories},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub jwt_config: DynJwtService,
    pub rate_limit: DynRateLimitMiddleware,
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    pub cors: CorsConfig,
    pub environment: String,
}

impl AppState {
    pub async fn new(repositories: Repositories, config: &Config) -> Self {
        let jwt_config =
            Arc::new(JwtConfig::new(&config.jwt_secret, config.jwt_expires_in)) as DynJwtService;
        let hash = Arc::new(Hashing::new(config.bcrypt_salt_rounds)) as DynHashing;
        let registry = Arc::new(Mutex::new(Registry::default()));

        let rate_limit = Arc::new(RateLimiter::new(&config.rate_limit)) as DynRateLimitMiddleware;
        tokio::spawn(prune_rate_limits(rate_limit.clone(), config.rate_limit.window));

        let di_container = DependenciesInject::new(DependenciesInjectDeps {
            repositories,
            hash,
            jwt: jwt_config.clone(),
            tx_timeout: config.order_tx_timeout,
            registry: registry.clone(),
        })
        .await;

        Self {
            jwt_config,
            rate_limit,
            di_container,
            registry,
            cors: config.cors.clone(),
            environment: config.app_env.clone(),
        }
    }
}

async fn prune_rate_limits(rate_limit: DynRateLimitMiddleware, every: Duration) {
    let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
    loop {
        ticker.tick().await;
        rate_limit.prune();
    }
}
