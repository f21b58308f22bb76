//! Per-client token bucket rate limiting.
//!
//! Each client identity owns a bucket holding up to `capacity` tokens that
//! refills continuously at `capacity / window` tokens per second. A request
//! consumes one token or is denied.
//!
//! The bucket table is a [`DashMap`] whose shard locks are held only for
//! lookup and insertion; token math runs under a per-bucket mutex, so
//! unrelated clients never contend on it.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Limits applied to every identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Requests allowed per window; also the burst size.
    pub capacity: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self { capacity, window }
    }
}

/// Outcome of [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Whole tokens left after this request.
    Allowed { remaining: u32 },
    /// Time until one token is available, never below one second.
    Denied { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    /// Set by [`RateLimiter::sweep`] under the bucket lock once the bucket
    /// has left the table. Tokens must never be taken from it afterwards.
    evicted: bool,
}

impl TokenBucket {
    fn full(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            tokens: f64::from(config.capacity),
            last_refill: now,
            evicted: false,
        }
    }

    fn take(&mut self, config: &RateLimitConfig, now: Instant) -> RateDecision {
        let capacity = f64::from(config.capacity);
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * capacity / config.window.as_secs_f64()).min(capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return RateDecision::Allowed {
                remaining: self.tokens.floor() as u32,
            };
        }

        let missing = 1.0 - self.tokens;
        let secs = (missing * config.window.as_secs_f64() / capacity)
            .ceil()
            .max(1.0);
        RateDecision::Denied {
            retry_after: Duration::from_secs_f64(secs),
        }
    }
}

/// Token bucket limiter keyed by client identity.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: DashMap<String, Arc<Mutex<TokenBucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: DashMap::new(),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Consumes a token for `identity` if one is available.
    pub fn check(&self, identity: &str) -> RateDecision {
        let now = Instant::now();
        let decision = self.consume(identity, self.bucket(identity, now), now);

        if !decision.is_allowed() {
            metrics::counter!("rate_limit_denied_total").increment(1);
            tracing::debug!(identity, "Rate limit exceeded");
        }

        decision
    }

    /// Shorthand for `check(identity).is_allowed()`.
    pub fn allow(&self, identity: &str) -> bool {
        self.check(identity).is_allowed()
    }

    /// Evicts buckets idle for at least twice the window.
    ///
    /// Buckets locked by a concurrent request are kept.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let idle_limit = self.config.window * 2;
        let before = self.buckets.len();

        self.buckets.retain(|_, bucket| match bucket.try_lock() {
            Some(mut b) => {
                let keep = now.saturating_duration_since(b.last_refill) < idle_limit;
                b.evicted = !keep;
                keep
            }
            None => true,
        });

        let evicted = before.saturating_sub(self.buckets.len());
        if evicted > 0 {
            tracing::debug!(evicted, "Swept idle rate limit buckets");
        }
        evicted
    }

    /// Number of identities currently tracked.
    pub fn tracked(&self) -> usize {
        self.buckets.len()
    }

    /// Runs [`Self::sweep`] every `period` until the handle is shut down or
    /// dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> SweeperHandle {
        let limiter = Arc::clone(self);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        limiter.sweep();
                    }
                    _ = &mut stop_rx => break,
                }
            }
            tracing::debug!("Rate limit sweeper stopped");
        });

        SweeperHandle {
            stop: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Takes a token from `bucket`, or from its replacement if a sweep
    /// evicted it after it was looked up.
    fn consume(
        &self,
        identity: &str,
        mut bucket: Arc<Mutex<TokenBucket>>,
        now: Instant,
    ) -> RateDecision {
        loop {
            {
                let mut state = bucket.lock();
                if !state.evicted {
                    return state.take(&self.config, now);
                }
            }
            bucket = self.bucket(identity, now);
        }
    }

    fn bucket(&self, identity: &str, now: Instant) -> Arc<Mutex<TokenBucket>> {
        if let Some(bucket) = self.buckets.get(identity) {
            return Arc::clone(bucket.value());
        }

        Arc::clone(
            self.buckets
                .entry(identity.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(TokenBucket::full(&self.config, now))))
                .value(),
        )
    }
}

/// Owns the background sweeper task.
#[derive(Debug)]
pub struct SweeperHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stops the sweeper and waits for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "Rate limit sweeper ended abnormally");
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}
