//! Request rate limiting
//!
//! Token bucket per client key (fixed point budget per second) with an
//! exponentially growing, capped ban on repeated violation. Per-key
//! state lives behind the [`RateLimitStore`] trait so the in-memory
//! map can be swapped for a shared cache in a multi-instance
//! deployment; entries carry a TTL and are evicted on access.

use async_trait::async_trait;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::core::ServerState;
use crate::utils::AppError;

/// Rate limiter tuning
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub points: u32,
    /// Window length (milliseconds)
    pub window_ms: i64,
    /// First ban duration (seconds)
    pub initial_ban_secs: u64,
    /// Ban duration multiplier on repeated violation
    pub ban_multiplier: u64,
    /// Ban duration cap (seconds)
    pub max_ban_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            points: 5,
            window_ms: 1_000,
            initial_ban_secs: 10,
            ban_multiplier: 2,
            max_ban_secs: 3_600,
        }
    }
}

/// Per-key limiter state
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    pub tokens_used: u32,
    pub window_start_ms: i64,
    pub banned_until_ms: i64,
    /// Duration of the most recent ban; doubles on each violation
    pub last_ban_secs: u64,
}

/// Storage backend for per-key limiter state
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn load(&self, key: &str, now_ms: i64) -> Option<KeyState>;
    async fn save(&self, key: &str, state: KeyState, now_ms: i64, ttl_ms: i64);
}

struct Entry {
    state: KeyState,
    expires_at_ms: i64,
}

/// In-memory store with TTL eviction on access
#[derive(Default)]
pub struct MemoryRateLimitStore {
    entries: DashMap<String, Entry>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) keys; expired keys are dropped
    pub fn len(&self, now_ms: i64) -> usize {
        self.entries.retain(|_, e| e.expires_at_ms > now_ms);
        self.entries.len()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn load(&self, key: &str, now_ms: i64) -> Option<KeyState> {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at_ms > now_ms {
                return Some(entry.state.clone());
            }
        }
        self.entries.remove(key);
        None
    }

    async fn save(&self, key: &str, state: KeyState, now_ms: i64, ttl_ms: i64) {
        self.entries.insert(
            key.to_string(),
            Entry {
                state,
                expires_at_ms: now_ms + ttl_ms,
            },
        );
    }
}

/// Outcome of one request against the limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Banned { retry_after_secs: u64 },
}

/// Token-bucket limiter with escalating bans
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub async fn check(&self, key: &str, now_ms: i64) -> RateDecision {
        let mut state = self.store.load(key, now_ms).await.unwrap_or_default();

        if state.banned_until_ms > now_ms {
            let remaining = ((state.banned_until_ms - now_ms) as u64).div_ceil(1_000);
            return RateDecision::Banned {
                retry_after_secs: remaining.max(1),
            };
        }

        if now_ms - state.window_start_ms >= self.config.window_ms {
            state.window_start_ms = now_ms;
            state.tokens_used = 0;
        }

        state.tokens_used += 1;

        if state.tokens_used > self.config.points {
            let ban_secs = if state.last_ban_secs == 0 {
                self.config.initial_ban_secs
            } else {
                (state.last_ban_secs * self.config.ban_multiplier).min(self.config.max_ban_secs)
            };
            state.last_ban_secs = ban_secs;
            state.banned_until_ms = now_ms + (ban_secs as i64) * 1_000;
            // Keep the entry alive past the ban so repeat offenders escalate
            let ttl_ms = (ban_secs as i64) * 1_000 + 60_000;
            self.store.save(key, state, now_ms, ttl_ms).await;
            return RateDecision::Banned {
                retry_after_secs: ban_secs,
            };
        }

        let ttl_ms = self.config.window_ms * 2;
        self.store.save(key, state, now_ms, ttl_ms).await;
        RateDecision::Allowed
    }
}

/// Axum middleware applying the limiter per client address
pub async fn rate_limit(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&req);
    let now_ms = shared::util::now_millis();

    match state.rate_limiter.check(&key, now_ms).await {
        RateDecision::Allowed => Ok(next.run(req).await),
        RateDecision::Banned { retry_after_secs } => {
            let minutes = retry_after_secs.div_ceil(60);
            Err(AppError::RateLimited(format!(
                "Too many requests. You are banned for {minutes} minutes."
            )))
        }
    }
}

fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
    {
        return first.trim().to_string();
    }
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(
            Arc::new(MemoryRateLimitStore::new()),
            RateLimitConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_budget_within_window() {
        let limiter = limiter();
        for _ in 0..5 {
            assert_eq!(limiter.check("1.2.3.4", 1_000).await, RateDecision::Allowed);
        }
        assert_eq!(
            limiter.check("1.2.3.4", 1_000).await,
            RateDecision::Banned {
                retry_after_secs: 10
            }
        );
    }

    #[tokio::test]
    async fn test_window_resets_budget() {
        let limiter = limiter();
        for _ in 0..5 {
            assert_eq!(limiter.check("k", 1_000).await, RateDecision::Allowed);
        }
        // Next second: fresh budget
        assert_eq!(limiter.check("k", 2_100).await, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn test_ban_escalates_and_caps() {
        let config = RateLimitConfig {
            max_ban_secs: 30,
            ..RateLimitConfig::default()
        };
        let limiter = RateLimiter::new(Arc::new(MemoryRateLimitStore::new()), config);

        let mut now = 0;
        for expect in [10u64, 20, 30, 30] {
            for _ in 0..5 {
                assert_eq!(limiter.check("k", now).await, RateDecision::Allowed);
            }
            assert_eq!(
                limiter.check("k", now).await,
                RateDecision::Banned {
                    retry_after_secs: expect
                }
            );
            // Jump past the ban, stay within the entry TTL
            now += (expect as i64) * 1_000 + 1_000;
        }
    }

    #[tokio::test]
    async fn test_requests_during_ban_stay_banned() {
        let limiter = limiter();
        for _ in 0..6 {
            limiter.check("k", 0).await;
        }
        assert!(matches!(
            limiter.check("k", 5_000).await,
            RateDecision::Banned { .. }
        ));
        // Ban over: allowed again
        assert_eq!(limiter.check("k", 10_500).await, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn test_ttl_eviction() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let limiter = RateLimiter::new(store.clone(), RateLimitConfig::default());

        limiter.check("k", 0).await;
        assert_eq!(store.len(0), 1);
        // Entry TTL is two windows; long after that it is gone
        assert_eq!(store.len(10_000), 0);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter();
        for _ in 0..6 {
            limiter.check("a", 0).await;
        }
        assert_eq!(limiter.check("b", 0).await, RateDecision::Allowed);
    }
}
