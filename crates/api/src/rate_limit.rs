//! Fixed-window rate limiting keyed by client address.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;

use crate::config::RateLimitConfig;
use crate::error::ApiError;

/// Windows are pruned once this many clients are being tracked.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    used: u32,
}

/// Shared fixed-window limiter.
///
/// Each client key gets `permits` requests per `window`; the count resets
/// when a request arrives after the window has elapsed.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    permits: u32,
    window: Duration,
    trusted_proxies: Arc<[IpAddr]>,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            permits: config.permits,
            window: config.window,
            trusted_proxies: config.trusted_proxies.into(),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Takes one permit for `key`, returning `false` when none are left.
    pub async fn try_acquire(&self, key: &str) -> bool {
        self.try_acquire_at(key, Instant::now()).await
    }

    async fn try_acquire_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().await;

        if windows.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            used: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                used: 0,
            };
        }

        if entry.used >= self.permits {
            return false;
        }
        entry.used += 1;
        true
    }

    fn trusts(&self, peer: IpAddr) -> bool {
        peer.is_loopback() || self.trusted_proxies.contains(&peer)
    }

    /// Identifies the client.
    ///
    /// The first `X-Forwarded-For` hop is used only when the socket peer is
    /// a trusted proxy; otherwise the peer IP itself is the key. Requests
    /// without connection info share an `"unknown"` bucket.
    pub fn client_key(&self, request: &Request) -> String {
        let Some(peer) = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
        else {
            return "unknown".to_string();
        };

        if self.trusts(peer) {
            let forwarded = request
                .headers()
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|hop| !hop.is_empty());
            if let Some(hop) = forwarded {
                return hop.to_string();
            }
        }

        peer.to_string()
    }
}

/// Middleware rejecting requests over the limit with 429.
pub async fn limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = limiter.client_key(&request);
    if !limiter.try_acquire(&key).await {
        metrics::counter!("rate_limited_total").increment(1);
        tracing::warn!(client = %key, "rate limit exceeded");
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http;

    use super::*;

    fn limiter(permits: u32, secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            permits,
            window: Duration::from_secs(secs),
            ..RateLimitConfig::default()
        })
    }

    fn build_request(peer: Option<&str>, forwarded: Option<&str>) -> Request {
        let mut builder = http::Request::builder();
        if let Some(forwarded) = forwarded {
            builder = builder.header("x-forwarded-for", forwarded);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        if let Some(peer) = peer {
            let addr: SocketAddr = peer.parse().unwrap();
            request.extensions_mut().insert(ConnectInfo(addr));
        }
        request
    }

    #[tokio::test]
    async fn permits_are_counted_per_key() {
        let limiter = limiter(2, 10);
        let now = Instant::now();

        assert!(limiter.try_acquire_at("a", now).await);
        assert!(limiter.try_acquire_at("a", now).await);
        assert!(!limiter.try_acquire_at("a", now).await);
        assert!(limiter.try_acquire_at("b", now).await);
    }

    #[tokio::test]
    async fn window_resets_after_elapsing() {
        let limiter = limiter(1, 10);
        let start = Instant::now();

        assert!(limiter.try_acquire_at("a", start).await);
        assert!(!limiter.try_acquire_at("a", start + Duration::from_secs(9)).await);
        assert!(limiter.try_acquire_at("a", start + Duration::from_secs(10)).await);
    }

    #[test]
    fn loopback_proxy_forwards_first_hop() {
        let request = build_request(Some("127.0.0.1:5000"), Some(" 203.0.113.7 , 10.0.0.1"));
        assert_eq!(limiter(1, 10).client_key(&request), "203.0.113.7");
    }

    #[test]
    fn configured_proxy_forwards_first_hop() {
        let limiter = RateLimiter::new(RateLimitConfig {
            trusted_proxies: vec!["10.0.0.5".parse().unwrap()],
            ..RateLimitConfig::default()
        });
        let request = build_request(Some("10.0.0.5:5000"), Some("203.0.113.7"));
        assert_eq!(limiter.client_key(&request), "203.0.113.7");
    }

    #[test]
    fn untrusted_peer_cannot_choose_its_key() {
        let limiter = limiter(1, 10);
        for hop in ["10.9.8.1", "10.9.8.2", "10.9.8.3"] {
            let request = build_request(Some("198.51.100.4:4000"), Some(hop));
            assert_eq!(limiter.client_key(&request), "198.51.100.4");
        }
    }

    #[test]
    fn trusted_proxy_without_header_keys_on_peer() {
        let request = build_request(Some("[::1]:4000"), None);
        assert_eq!(limiter(1, 10).client_key(&request), "::1");
    }

    #[test]
    fn missing_connection_info_ignores_forwarded_header() {
        let request = build_request(None, Some("203.0.113.7"));
        assert_eq!(limiter(1, 10).client_key(&request), "unknown");
    }
}
