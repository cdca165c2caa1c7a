use crate::backend::{FetchError, StatsSource};
use crate::metrics_defs::{
    REFRESH_COALESCED, REFRESH_DURATION, REFRESH_FAILURE, REFRESH_SUCCESS, SERVED_STALE,
};
use crate::stats::DashboardStats;
use parking_lot::RwLock;
use shared::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, watch};

/// Cache key for the dashboard snapshot. There is a single entry today; the
/// key appears in logs so more entries can be told apart later.
pub const DASHBOARD_KEY: &str = "dashboard-stats";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Idle,
    Loading,
    Fresh,
    Stale,
    Error,
}

impl CacheStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Idle => "idle",
            CacheStatus::Loading => "loading",
            CacheStatus::Fresh => "fresh",
            CacheStatus::Stale => "stale",
            CacheStatus::Error => "error",
        }
    }
}

/// One complete cache entry. Replaced wholesale on every successful refresh;
/// a failed refresh only touches the status, never the value.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub value: Option<Arc<DashboardStats>>,
    pub fetched_at: Option<Instant>,
    pub status: CacheStatus,
}

impl Snapshot {
    fn empty() -> Self {
        Snapshot {
            value: None,
            fetched_at: None,
            status: CacheStatus::Idle,
        }
    }
}

/// In-memory cache for the dashboard snapshot. Built around one source and
/// one max-age, so tests construct isolated instances instead of sharing a
/// global.
#[derive(Clone)]
pub struct StatsCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    source: Arc<dyn StatsSource>,
    max_age: Duration,
    snapshot: RwLock<Snapshot>,
    // Single permit; a refresh trigger that cannot take it is dropped, not
    // queued.
    refresh_lock: Semaphore,
    updates: watch::Sender<Snapshot>,
}

impl StatsCache {
    pub fn new(source: Arc<dyn StatsSource>, max_age: Duration) -> Self {
        let (updates, _) = watch::channel(Snapshot::empty());

        StatsCache {
            inner: Arc::new(CacheInner {
                source,
                max_age,
                snapshot: RwLock::new(Snapshot::empty()),
                refresh_lock: Semaphore::new(1),
                updates,
            }),
        }
    }

    /// Returns the current entry without blocking. `None` means no fetch has
    /// succeeded yet; a value of zero is a real measurement.
    pub fn get_stats(&self) -> (Option<Arc<DashboardStats>>, CacheStatus) {
        let snap = self.inner.snapshot.read();
        let status = self.effective_status(&snap);
        if status == CacheStatus::Stale {
            counter!(SERVED_STALE).increment(1);
        }
        (snap.value.clone(), status)
    }

    /// Receiver yielding the snapshot published by each successful refresh.
    /// Failures never publish, so observers keep showing last-good numbers.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.updates.subscribe()
    }

    // A Fresh entry degrades to Stale once it outlives the refresh period
    // without a superseding fetch completing.
    fn effective_status(&self, snap: &Snapshot) -> CacheStatus {
        match (snap.status, snap.fetched_at) {
            (CacheStatus::Fresh, Some(at)) if at.elapsed() > self.inner.max_age => {
                CacheStatus::Stale
            }
            (status, _) => status,
        }
    }

    /// Fetches a new snapshot and replaces the cache entry atomically. At
    /// most one refresh runs at a time; a trigger that arrives while one is
    /// in flight returns `FetchError::RefreshInFlight` without issuing a
    /// request.
    pub async fn refresh(&self) -> Result<Arc<DashboardStats>, FetchError> {
        let _permit = match self.inner.refresh_lock.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                counter!(REFRESH_COALESCED).increment(1);
                return Err(FetchError::RefreshInFlight);
            }
        };

        {
            let mut snap = self.inner.snapshot.write();
            if snap.value.is_none() {
                snap.status = CacheStatus::Loading;
            }
        }

        let started = Instant::now();
        match self.inner.source.fetch_dashboard().await {
            Ok(stats) => {
                let value = Arc::new(stats);
                let published = {
                    let mut snap = self.inner.snapshot.write();
                    *snap = Snapshot {
                        value: Some(value.clone()),
                        fetched_at: Some(Instant::now()),
                        status: CacheStatus::Fresh,
                    };
                    snap.clone()
                };
                histogram!(REFRESH_DURATION).record(started.elapsed().as_secs_f64());
                counter!(REFRESH_SUCCESS).increment(1);
                self.inner.updates.send_replace(published);
                Ok(value)
            }
            Err(err) => {
                // Keep whatever value is already cached; only flag the failure.
                self.inner.snapshot.write().status = CacheStatus::Error;
                counter!(REFRESH_FAILURE).increment(1);
                tracing::warn!(key = DASHBOARD_KEY, error = %err, "dashboard refresh failed");
                Err(err)
            }
        }
    }
}
