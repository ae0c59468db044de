//! Login rate limiting.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, Weak},
    time::Duration,
};

use super::proxy::ForwardedInfo;
use crate::app::AppContext;
use crate::web::error::ApiError;

/// How often idle client entries are evicted.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Per-client login limiters.
pub struct RateLimitState {
    limiter: DefaultKeyedRateLimiter<String>,
    quota: Quota,
}

impl RateLimitState {
    /// Allow `per_minute` login attempts per client.
    pub fn new(per_minute: u32) -> Self {
        Self::with_quota(Quota::per_minute(
            NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN),
        ))
    }

    /// Limit each client to `quota`.
    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
            quota,
        }
    }

    /// Record an attempt; false when the client is over its limit.
    pub fn check(&self, client: &str) -> bool {
        self.limiter.check_key(&client.to_string()).is_ok()
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Forget clients whose quota has fully replenished.
    ///
    /// Such a client is indistinguishable from one never seen, so
    /// dropping it loses no limiting state.
    pub fn cleanup(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        let evicted = before.saturating_sub(self.limiter.len());
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle login rate limit entries");
        }
    }

    /// Run [`cleanup`](Self::cleanup) every `every` until the state is dropped.
    pub fn start_cleanup_task(self: &Arc<Self>, every: Duration) {
        let state: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                match state.upgrade() {
                    Some(state) => state.cleanup(),
                    None => break,
                }
            }
        });
    }
}

impl std::fmt::Debug for RateLimitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitState")
            .field("quota", &self.quota)
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}

/// Client address: trusted forwarded address, then the socket peer.
fn client_ip(req: &Request<Body>) -> String {
    if let Some(ip) = req
        .extensions()
        .get::<ForwardedInfo>()
        .and_then(|info| info.client_ip.clone())
    {
        return ip;
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Limit login submissions (POST) per client.
pub async fn login_rate_limit(
    State(ctx): State<Arc<AppContext>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() == Method::POST {
        let ip = client_ip(&req);
        if !ctx.rate_limit.check(&ip) {
            tracing::warn!(ip = %ip, "Login rate limit exceeded");
            return ApiError::too_many_requests(
                "Too many login attempts. Please try again later.",
            )
            .into_response();
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_rate_limit() {
        let state = RateLimitState::new(3);

        assert!(state.check("127.0.0.1"));
        assert!(state.check("127.0.0.1"));
        assert!(state.check("127.0.0.1"));
        assert!(!state.check("127.0.0.1"));

        // Other clients are unaffected
        assert!(state.check("192.168.1.1"));
        assert_eq!(state.tracked_clients(), 2);
    }

    #[test]
    fn test_zero_limit_still_allows_one() {
        let state = RateLimitState::new(0);
        assert!(state.check("10.0.0.1"));
        assert!(!state.check("10.0.0.1"));
    }

    #[test]
    fn test_client_ip_prefers_forwarded() {
        let mut req = Request::new(Body::empty());
        req.extensions_mut()
            .insert(ConnectInfo("10.0.0.1:4000".parse::<SocketAddr>().unwrap()));
        assert_eq!(client_ip(&req), "10.0.0.1");

        req.extensions_mut().insert(ForwardedInfo {
            client_ip: Some("203.0.113.9".to_string()),
            ..ForwardedInfo::default()
        });
        assert_eq!(client_ip(&req), "203.0.113.9");

        assert_eq!(client_ip(&Request::new(Body::empty())), "unknown");
    }

    #[test]
    fn test_cleanup_keeps_limited_clients() {
        let state = RateLimitState::new(1);
        assert!(state.check("10.0.0.1"));

        state.cleanup();

        assert_eq!(state.tracked_clients(), 1);
        assert!(!state.check("10.0.0.1"));
    }

    #[test]
    fn test_cleanup_evicts_replenished_clients() {
        let quota = Quota::with_period(Duration::from_millis(10)).unwrap();
        let state = RateLimitState::with_quota(quota);

        for i in 0..500 {
            assert!(state.check(&format!("198.51.{}.{}", i / 256, i % 256)));
        }
        assert_eq!(state.tracked_clients(), 500);

        std::thread::sleep(Duration::from_millis(50));
        state.cleanup();

        assert_eq!(state.tracked_clients(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_task_runs_periodically() {
        let quota = Quota::with_period(Duration::from_millis(1)).unwrap();
        let state = Arc::new(RateLimitState::with_quota(quota));
        assert!(state.check("203.0.113.1"));

        state.start_cleanup_task(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(state.tracked_clients(), 0);
    }
}
