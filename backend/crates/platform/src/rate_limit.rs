//! Rate Limiting Infrastructure
//!
//! Fixed-window admission control keyed by `(client id, category)`.
//!
//! Each key owns one window. A window that has been open longer than the
//! policy duration is discarded and restarted on the next call; it never
//! rolls. Counters are held in-process only: no I/O, no background task.
//! Stale counters are swept opportunistically on a fraction of calls to
//! bound map growth.

use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Category used when a caller passes one the policy does not know
pub const DEFAULT_CATEGORY: &str = "default";

/// Rate limit policy
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    /// Window duration shared by every category
    pub window: Duration,
    /// Per-category ceiling (max admitted calls per window)
    pub ceilings: HashMap<String, u32>,
    /// Ceiling for categories missing from `ceilings`
    pub default_ceiling: u32,
    /// Chance in `[0, 1]` that a call also sweeps stale counters
    pub cleanup_probability: f64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            ceilings: HashMap::new(),
            default_ceiling: 30,
            cleanup_probability: 0.1,
        }
        .with_ceiling("submit", 5)
        .with_ceiling("sanitize", 10)
        .with_ceiling("analyze", 10)
        .with_ceiling("transform", 20)
    }
}

impl RateLimitPolicy {
    pub fn new(window_secs: u64, default_ceiling: u32) -> Self {
        Self {
            window: Duration::from_secs(window_secs),
            ceilings: HashMap::new(),
            default_ceiling,
            cleanup_probability: 0.1,
        }
    }

    pub fn with_ceiling(mut self, category: impl Into<String>, max_requests: u32) -> Self {
        self.ceilings.insert(category.into(), max_requests);
        self
    }

    /// Ceiling for a category, falling back to the default
    pub fn ceiling(&self, category: &str) -> u32 {
        self.ceilings
            .get(category)
            .copied()
            .unwrap_or(self.default_ceiling)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// Whole seconds until the window reopens; `Some` only when denied
    pub retry_after_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    window_start: Instant,
    count: u32,
}

/// In-memory fixed-window rate limiter
///
/// Construct once at startup and share behind an `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    windows: DashMap<(String, String), WindowCounter>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            windows: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Check and count one call for `client_id` under `category`
    pub fn check(&self, client_id: &str, category: &str) -> RateLimitResult {
        let now = Instant::now();
        if rand::random::<f64>() < self.policy.cleanup_probability {
            let removed = self.cleanup_at(now);
            if removed > 0 {
                tracing::debug!(removed, "Swept stale rate limit windows");
            }
        }
        self.check_at(client_id, category, now)
    }

    /// Same as [`check`](Self::check) against an explicit clock reading
    pub fn check_at(&self, client_id: &str, category: &str, now: Instant) -> RateLimitResult {
        let max_requests = self.policy.ceiling(category);
        let window = self.policy.window;

        if max_requests == 0 {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                retry_after_secs: Some(ceil_secs(window).max(1)),
            };
        }

        let mut entry = self
            .windows
            .entry((client_id.to_string(), category.to_string()))
            .or_insert(WindowCounter {
                window_start: now,
                count: 0,
            });
        let counter = entry.value_mut();

        if counter.count == 0 || now.saturating_duration_since(counter.window_start) > window {
            *counter = WindowCounter {
                window_start: now,
                count: 1,
            };
            return RateLimitResult {
                allowed: true,
                remaining: max_requests.saturating_sub(1),
                retry_after_secs: None,
            };
        }

        if counter.count >= max_requests {
            let wait = (counter.window_start + window).saturating_duration_since(now);
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                retry_after_secs: Some(ceil_secs(wait).max(1)),
            };
        }

        counter.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: max_requests - counter.count,
            retry_after_secs: None,
        }
    }

    /// Drop every counter whose window has elapsed; returns how many went
    pub fn cleanup_at(&self, now: Instant) -> usize {
        let window = self.policy.window;
        let before = self.windows.len();
        self.windows
            .retain(|_, counter| now.saturating_duration_since(counter.window_start) <= window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let millis = d.as_millis() as u64;
    millis.div_ceil(1000)
}
