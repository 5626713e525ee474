use crate::abstract_trait::rate_limit::{
    RateLimitDecision, RateLimitMiddlewareTrait, RateLimitPolicy,
};
use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::{Clock, DefaultClock},
    middleware::StateInformationMiddleware,
    state::keyed::DefaultKeyedStateStore,
};
use shared::config::RateLimitConfig;
use std::{num::NonZeroU32, time::Duration};
use tracing::debug;

type KeyedLimiter = GovernorRateLimiter<
    String,
    DefaultKeyedStateStore<String>,
    DefaultClock,
    StateInformationMiddleware,
>;

/// Per-client GCRA limiter: a burst of `limit` requests, refilled evenly over
/// the window.
pub struct RateLimiter {
    limiter: KeyedLimiter,
    policy: RateLimitPolicy,
    replenish_every: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
        let replenish_every = config.window / burst.get();

        let quota = Quota::with_period(replenish_every)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: GovernorRateLimiter::keyed(quota)
                .with_middleware::<StateInformationMiddleware>(),
            policy: RateLimitPolicy {
                limit: burst.get(),
                window: config.window,
                trust_proxy: config.trust_proxy,
            },
            replenish_every,
        }
    }
}

impl RateLimitMiddlewareTrait for RateLimiter {
    fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    fn check_rate_limit(&self, key: &str) -> RateLimitDecision {
        match self.limiter.check_key(&key.to_string()) {
            Ok(snapshot) => {
                let remaining = snapshot.remaining_burst_capacity();
                let used = self.policy.limit.saturating_sub(remaining);
                RateLimitDecision {
                    allowed: true,
                    remaining,
                    reset_after: self.replenish_every * used,
                }
            }
            Err(not_until) => {
                debug!("Rate limit exceeded for key: {key}");
                RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    reset_after: not_until.wait_time_from(self.limiter.clock().now()),
                }
            }
        }
    }

    fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window: Duration) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            window,
            max_requests,
            trust_proxy: true,
        })
    }

    #[test]
    fn blocks_after_the_burst_is_spent() {
        let limiter = limiter(2, Duration::from_secs(60));

        let first = limiter.check_rate_limit("a");
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        let second = limiter.check_rate_limit("a");
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.check_rate_limit("a");
        assert!(!third.allowed);
        assert!(third.reset_after > Duration::ZERO);
        assert!(third.reset_after <= Duration::from_secs(30));

        // other clients are counted separately
        assert!(limiter.check_rate_limit("b").allowed);
    }

    #[test]
    fn quota_refills_over_the_window() {
        let limiter = limiter(1, Duration::from_millis(20));

        assert!(limiter.check_rate_limit("a").allowed);
        assert!(!limiter.check_rate_limit("a").allowed);
        std::thread::sleep(Duration::from_millis(40));
        assert!(limiter.check_rate_limit("a").allowed);
    }

    #[test]
    fn prune_keeps_active_clients_limited() {
        let limiter = limiter(1, Duration::from_secs(60));

        assert!(limiter.check_rate_limit("a").allowed);
        limiter.prune();
        assert!(!limiter.check_rate_limit("a").allowed);
        assert_eq!(limiter.policy().limit, 1);
    }
}
