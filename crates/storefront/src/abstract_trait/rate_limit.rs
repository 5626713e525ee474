use std::{sync::Arc, time::Duration};

pub type DynRateLimitMiddleware = Arc<dyn RateLimitMiddlewareTrait + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window: Duration,
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Until the quota is full again, or until the next request is allowed
    /// when denied.
    pub reset_after: Duration,
}

pub trait RateLimitMiddlewareTrait {
    fn policy(&self) -> &RateLimitPolicy;
    /// Counts one request against `key`.
    fn check_rate_limit(&self, key: &str) -> RateLimitDecision;
    /// Forgets keys whose quota has fully replenished.
    fn prune(&self);
}
