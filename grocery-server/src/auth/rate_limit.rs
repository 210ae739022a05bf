//! Per-IP rate limiting for login and sign-up

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::ServerState;
use crate::security_log;
use shared::error::AppError;

const LOGIN_MAX: u32 = 5;
const SIGNUP_MAX: u32 = 3;
const WINDOW_SECS: u64 = 60;
const STALE_AFTER: Duration = Duration::from_secs(300);

struct IpEntry {
    count: u32,
    window_start: Instant,
}

/// Fixed-window counter per route and client IP
#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if the request is allowed
    pub async fn check(&self, route: &'static str, ip: &str, max_requests: u32, window_secs: u64) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Drop entries whose window started more than 5 minutes ago
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < STALE_AFTER);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Client IP: first `X-Forwarded-For` entry, then the peer address
pub fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn limit(
    state: &ServerState,
    route: &'static str,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(&request);
    if !state.rate_limiter.check(route, &ip, max_requests, WINDOW_SECS).await {
        security_log!("WARN", "rate_limited", route = route, ip = ip);
        return Err(AppError::too_many_requests());
    }
    Ok(next.run(request).await)
}

/// 5 login attempts per minute per IP
pub async fn login_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "login", LOGIN_MAX, request, next).await
}

/// 3 sign-ups per minute per IP
pub async fn signup_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "signup", SIGNUP_MAX, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn window_allows_up_to_max() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check("signup", "10.0.0.1", 3, 60).await);
        }
        assert!(!limiter.check("signup", "10.0.0.1", 3, 60).await);
        // other IPs and routes are counted separately
        assert!(limiter.check("signup", "10.0.0.2", 3, 60).await);
        assert!(limiter.check("login", "10.0.0.1", 3, 60).await);
    }

    #[tokio::test]
    async fn expired_window_starts_over() {
        let limiter = RateLimiter::new();
        // a zero-second window has always expired
        for _ in 0..5 {
            assert!(limiter.check("login", "1.1.1.1", 1, 0).await);
        }
    }

    #[tokio::test]
    async fn cleanup_keeps_fresh_entries() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("login", "1.1.1.1", 1, 60).await);
        limiter.cleanup().await;
        assert!(!limiter.check("login", "1.1.1.1", 1, 60).await);
    }

    #[test]
    fn forwarded_for_wins_over_peer() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_ip(&req), "203.0.113.9");

        let bare = Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(extract_ip(&bare), "unknown");
    }
}
