//! Per-client request limits
//!
//! Fixed windows keyed by client address and endpoint class, kept in a
//! concurrent map so handlers can check without a global lock.

use std::time::{Duration, Instant};

use actix_web::HttpRequest;
use dashmap::DashMap;
use serde::Serialize;

/// Windows tracked before stale ones are swept
const PRUNE_THRESHOLD: usize = 10_000;

/// Endpoint groups with their own budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitClass {
    Brew,
    Fill,
    Status,
}

impl LimitClass {
    /// Requests allowed per window
    pub fn limit(self) -> u32 {
        match self {
            LimitClass::Brew => 20,
            LimitClass::Fill => 30,
            LimitClass::Status => 60,
        }
    }
}

/// Rejection carrying when the client may retry
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimited {
    pub class: LimitClass,
    pub limit: u32,
    pub retry_after: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    enabled: bool,
    window: Duration,
    windows: DashMap<(String, LimitClass), Window>,
}

impl RateLimiter {
    /// One-minute windows
    pub fn new(enabled: bool) -> Self {
        Self::with_window(enabled, Duration::from_secs(60))
    }

    pub fn with_window(enabled: bool, window: Duration) -> Self {
        Self {
            enabled,
            window,
            windows: DashMap::new(),
        }
    }

    pub fn check(&self, client: &str, class: LimitClass) -> Result<(), RateLimited> {
        self.check_at(client, class, Instant::now())
    }

    /// Count one request from `client` at `now`
    pub fn check_at(&self, client: &str, class: LimitClass, now: Instant) -> Result<(), RateLimited> {
        if !self.enabled {
            return Ok(());
        }

        if self.windows.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let limit = class.limit();
        let mut window = self
            .windows
            .entry((client.to_string(), class))
            .or_insert(Window {
                started: now,
                count: 0,
            });

        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= limit {
            return Err(RateLimited {
                class,
                limit,
                retry_after: self.window.saturating_sub(elapsed),
            });
        }

        window.count += 1;
        Ok(())
    }

    /// Drop windows that have expired
    pub fn prune(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
    }

    pub fn tracked_windows(&self) -> usize {
        self.windows.len()
    }
}

/// Client address, preferring the first `X-Forwarded-For` hop
pub fn client_key(req: &HttpRequest) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
