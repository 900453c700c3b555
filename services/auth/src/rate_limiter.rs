//! Login attempt limiter for slowing down password guessing

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed per window
    pub max_attempts: u32,
    /// Time window
    pub window: Duration,
    /// How long a key stays blocked once it exceeds the limit
    pub ban_duration: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(300),
            ban_duration: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug)]
struct Attempts {
    count: u32,
    window_start: Instant,
    banned_until: Option<Instant>,
}

/// Per-key attempt counter shared between request handlers
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Attempts>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn try_acquire(&self, key: &str) -> bool {
        self.try_acquire_at(key, Instant::now()).await
    }

    async fn try_acquire_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().await;

        // Drop keys whose window has passed and that are not serving a ban
        let window = self.config.window;
        entries.retain(|_, attempts| {
            attempts.banned_until.is_some_and(|until| now < until)
                || now.duration_since(attempts.window_start) < window
        });

        let entry = entries.entry(key.to_string()).or_insert(Attempts {
            count: 0,
            window_start: now,
            banned_until: None,
        });

        if let Some(banned_until) = entry.banned_until {
            if now < banned_until {
                return false;
            }
            entry.banned_until = None;
            entry.count = 0;
            entry.window_start = now;
        }

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.config.max_attempts {
            entry.banned_until = Some(now + self.config.ban_duration);
            warn!(
                "Blocked {} for {} seconds after {} attempts",
                key,
                self.config.ban_duration.as_secs(),
                entry.count
            );
            return false;
        }

        entry.count += 1;
        true
    }

    /// Forget the attempts recorded for `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            window: Duration::from_secs(60),
            ban_duration: Duration::from_secs(600),
        })
    }

    #[tokio::test]
    async fn test_blocks_after_max_attempts() {
        let limiter = limiter(3);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.try_acquire_at("jo@x.com", now).await);
        }
        assert!(!limiter.try_acquire_at("jo@x.com", now).await);
        assert!(limiter.try_acquire_at("other@x.com", now).await);
    }

    #[tokio::test]
    async fn test_ban_expires() {
        let limiter = limiter(1);
        let now = Instant::now();

        assert!(limiter.try_acquire_at("jo@x.com", now).await);
        assert!(!limiter.try_acquire_at("jo@x.com", now).await);
        assert!(
            !limiter
                .try_acquire_at("jo@x.com", now + Duration::from_secs(599))
                .await
        );
        assert!(
            limiter
                .try_acquire_at("jo@x.com", now + Duration::from_secs(601))
                .await
        );
    }

    #[tokio::test]
    async fn test_window_resets_count() {
        let limiter = limiter(2);
        let now = Instant::now();

        assert!(limiter.try_acquire_at("jo@x.com", now).await);
        assert!(limiter.try_acquire_at("jo@x.com", now).await);
        assert!(
            limiter
                .try_acquire_at("jo@x.com", now + Duration::from_secs(61))
                .await
        );
    }

    #[tokio::test]
    async fn test_reset_clears_attempts() {
        let limiter = limiter(1);

        assert!(limiter.try_acquire("jo@x.com").await);
        limiter.reset("jo@x.com").await;
        assert!(limiter.try_acquire("jo@x.com").await);
        assert_eq!(limiter.config().max_attempts, 1);
    }

    #[tokio::test]
    async fn test_stale_keys_are_evicted() {
        let limiter = limiter(1);
        let now = Instant::now();

        for i in 0..1000 {
            assert!(limiter.try_acquire_at(&format!("ghost{}@x.com", i), now).await);
        }
        assert!(limiter.try_acquire_at("jo@x.com", now).await);
        assert!(!limiter.try_acquire_at("jo@x.com", now).await);
        assert_eq!(limiter.entries.lock().await.len(), 1001);

        let later = now + Duration::from_secs(61);
        assert!(limiter.try_acquire_at("new@x.com", later).await);

        // The banned key outlives its window
        assert_eq!(limiter.entries.lock().await.len(), 2);
        assert!(!limiter.try_acquire_at("jo@x.com", later).await);
    }
}
