//! Per-client admission control.
//!
//! Each client key gets its own token bucket, created on first sight with a
//! full bucket of [`CLIENT_BURST`] admissions that refills at one admission per
//! [`REFILL_PERIOD`]. The bucket arithmetic is governor's GCRA, which is
//! equivalent to a continuously refilled token bucket.
//!
//! All limiters live in one map behind a single mutex. Creating a limiter and
//! taking a token from it happen in the same critical section, so concurrent
//! first requests from one client see exactly one limiter and never lose or
//! duplicate a token.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use governor::clock::{Clock, DefaultClock, Reference};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use smokeshop_core::ClientKey;
use tokio::task::JoinHandle;
use tracing::debug;

/// Admissions a client may make back to back before being throttled.
pub const CLIENT_BURST: NonZeroU32 = match NonZeroU32::new(5) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

/// Time for one admission to be restored.
pub const REFILL_PERIOD: Duration = Duration::from_secs(60);

/// A single client's limiter.
pub type DirectLimiter<C> =
    RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

struct ClientLimiter<C: Clock> {
    limiter: Arc<DirectLimiter<C>>,
    last_seen: C::Instant,
}

/// Registry of per-client rate limiters.
pub struct RateLimiterRegistry<C: Clock = DefaultClock> {
    limiters: Mutex<HashMap<ClientKey, ClientLimiter<C>>>,
    quota: Quota,
    clock: C,
}

impl RateLimiterRegistry<DefaultClock> {
    /// Create an empty registry on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(DefaultClock::default())
    }
}

impl Default for RateLimiterRegistry<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> RateLimiterRegistry<C> {
    /// Create an empty registry that reads time from `clock`.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        let quota = Quota::per_minute(NonZeroU32::MIN).allow_burst(CLIENT_BURST);
        Self {
            limiters: Mutex::new(HashMap::new()),
            quota,
            clock,
        }
    }

    /// Return the limiter for `key`, creating it with a full bucket if absent.
    pub fn get_or_create(&self, key: &ClientKey) -> Arc<DirectLimiter<C>> {
        let mut limiters = self.lock();
        Arc::clone(&self.entry(&mut limiters, key).limiter)
    }

    /// Take one admission from `key`'s bucket.
    ///
    /// Returns `false` when the bucket is empty.
    pub fn try_acquire(&self, key: &ClientKey) -> bool {
        let mut limiters = self.lock();
        self.entry(&mut limiters, key).limiter.check().is_ok()
    }

    /// Number of clients currently tracked.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no client is tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop limiters not used for longer than `max_idle`.
    ///
    /// `max_idle` is raised to the time a drained bucket needs to refill
    /// completely, so an evicted client never gains admissions by being
    /// forgotten. Returns the number of limiters removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let max_idle = max_idle.max(self.quota.burst_size_replenished_in());
        let now = self.clock.now();

        let mut limiters = self.lock();
        let before = limiters.len();
        limiters.retain(|_, client| {
            Duration::from(now.duration_since(client.last_seen)) <= max_idle
        });
        before - limiters.len()
    }

    fn entry<'a>(
        &self,
        limiters: &'a mut HashMap<ClientKey, ClientLimiter<C>>,
        key: &ClientKey,
    ) -> &'a ClientLimiter<C> {
        let now = self.clock.now();
        let client = limiters.entry(key.clone()).or_insert_with(|| {
            debug!(client_key = %key, "Creating rate limiter");
            ClientLimiter {
                limiter: Arc::new(RateLimiter::direct_with_clock(
                    self.quota,
                    self.clock.clone(),
                )),
                last_seen: now,
            }
        });
        client.last_seen = now;
        client
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientKey, ClientLimiter<C>>> {
        // Limiter state stays consistent even if a holder panicked.
        self.limiters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> RateLimiterRegistry<C>
where
    C: Clock + Clone + Send + Sync + 'static,
    C::Instant: Send + Sync,
{
    /// Run [`Self::evict_idle`] every `max_idle` (at least a second) on a
    /// background task.
    pub fn spawn_idle_sweep(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        let period = max_idle.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let evicted = registry.evict_idle(max_idle);
                if evicted > 0 {
                    debug!(evicted, remaining = registry.len(), "Evicted idle rate limiters");
                }
            }
        })
    }
}
