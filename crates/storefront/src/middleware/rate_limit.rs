use crate::abstract_trait::rate_limit::{
    DynRateLimitMiddleware, RateLimitDecision, RateLimitPolicy,
};
use axum::{
    Extension,
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderName, HeaderValue, Request, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::errors::HttpError;
use std::net::SocketAddr;
use tracing::warn;

/// First `x-forwarded-for` hop when proxies are trusted, then the peer
/// address, then `unknown`.
fn client_ip(req: &Request<Body>, trust_proxy: bool) -> String {
    let forwarded = if trust_proxy {
        req.headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    } else {
        None
    };

    forwarded
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn ceil_secs(duration: std::time::Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

// IETF draft-7 `RateLimit` / `RateLimit-Policy` fields
fn set_rate_limit_headers(
    headers: &mut HeaderMap,
    policy: &RateLimitPolicy,
    decision: &RateLimitDecision,
) {
    let fields = [
        (
            HeaderName::from_static("ratelimit-policy"),
            format!("{};w={}", policy.limit, policy.window.as_secs()),
        ),
        (
            HeaderName::from_static("ratelimit"),
            format!(
                "limit={}, remaining={}, reset={}",
                policy.limit,
                decision.remaining,
                ceil_secs(decision.reset_after)
            ),
        ),
    ];

    for (name, value) in fields {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(name, value);
        }
    }
}

pub async fn rate_limit_middleware(
    Extension(rate_limiter): Extension<DynRateLimitMiddleware>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let policy = rate_limiter.policy();
    let client_ip = client_ip(&req, policy.trust_proxy);

    let key = format!("rate_limit:{client_ip}");
    let decision = rate_limiter.check_rate_limit(&key);

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        warn!("Rate limit exceeded for IP: {client_ip}");
        let mut response = HttpError::TooManyRequests(
            "Too many requests, please try again later".to_string(),
        )
        .into_response();
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(ceil_secs(decision.reset_after)));
        response
    };

    set_rate_limit_headers(response.headers_mut(), policy, &decision);
    response
}
