//! # Rate Limiting
//!
//! Fixed-window request counters per client address.
//!
//! A client's window opens on its first request and lasts
//! [`RateLimitConfig::window`]. Requests beyond
//! [`RateLimitConfig::max_requests`] inside the window get a 429 and never
//! reach the rest of the stack. Expired windows are dropped by
//! [`spawn_purge_task`].

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use momo_core::SimulatorError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default maximum requests per window
pub const DEFAULT_MAX_REQUESTS: u32 = 60;

/// Default window duration in seconds
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Rate limiter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Length of a client's counting window
    pub window: Duration,
    /// Requests allowed per window
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
            max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

/// Result of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request may proceed
    Allowed { remaining: u32 },
    /// Ceiling reached; the window resets after `retry_after`
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started: Instant,
    hits: u32,
}

/// Concurrent per-client request counter
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    clients: DashMap<IpAddr, ClientWindow>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: DashMap::new(),
        }
    }

    /// Count a request from `client` and decide whether it may proceed
    pub fn check(&self, client: IpAddr) -> RateDecision {
        self.check_at(client, Instant::now())
    }

    pub(crate) fn check_at(&self, client: IpAddr, now: Instant) -> RateDecision {
        // The entry guard holds the shard lock, so concurrent requests from
        // one client are counted one at a time.
        let mut entry = self.clients.entry(client).or_insert(ClientWindow {
            started: now,
            hits: 0,
        });

        let mut elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.config.window {
            entry.started = now;
            entry.hits = 0;
            elapsed = Duration::ZERO;
        }

        entry.hits = entry.hits.saturating_add(1);

        if entry.hits > self.config.max_requests {
            RateDecision::Limited {
                retry_after: self.config.window - elapsed,
            }
        } else {
            RateDecision::Allowed {
                remaining: self.config.max_requests - entry.hits,
            }
        }
    }

    /// Drop clients whose window has elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub(crate) fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.clients.len();
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) < self.config.window);
        before.saturating_sub(self.clients.len())
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Shortest interval between purge runs
const MIN_PURGE_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically purge expired client windows, once per window length
/// (at least [`MIN_PURGE_INTERVAL`])
pub fn spawn_purge_task(limiter: Arc<RateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let period = limiter.config().window.max(MIN_PURGE_INTERVAL);
        let mut ticker = tokio::time::interval(period);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.purge_expired();
            if removed > 0 {
                debug!(removed, remaining = limiter.tracked_clients(), "purged rate limit windows");
            }
        }
    })
}

/// Address used to key the limiter.
///
/// With `trust_proxy`, the first `x-forwarded-for` entry wins. Otherwise the
/// TCP peer address is used; requests without either share one bucket.
pub fn client_ip(request: &Request, trust_proxy: bool) -> IpAddr {
    if trust_proxy {
        if let Some(ip) = forwarded_for(request.headers()) {
            return ip;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

/// Middleware: count the request and reject it once the client is over quota
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request, state.config.trust_proxy);
    let limit = state.limiter.config().max_requests;

    match state.limiter.check(client) {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            set_quota_headers(response.headers_mut(), limit, remaining);
            response
        }
        RateDecision::Limited { retry_after } => {
            let retry_after_secs = ceil_secs(retry_after);
            warn!(client = %client, retry_after_secs, "rate limit exceeded");

            let mut response =
                ApiError::from(SimulatorError::RateLimited { retry_after_secs }).into_response();
            let headers = response.headers_mut();
            set_quota_headers(headers, limit, 0);
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            response
        }
    }
}

fn set_quota_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(remaining),
    );
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    secs.max(1)
}
