use crate::backend::{FetchError, StatsSource};
use crate::stats::{DashboardStats, InboundStats, NodeStats, TaskStats, UserStats};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, Semaphore};

pub fn sample_stats() -> DashboardStats {
    DashboardStats {
        nodes: NodeStats {
            total: 5,
            online: 3,
            offline: 2,
        },
        users: UserStats {
            total: 10,
            active: 4,
        },
        tasks: TaskStats {
            total: 3,
            running: 1,
            completed: 2,
            failed: 0,
        },
        inbounds: InboundStats {
            total: 2,
            active: 2,
        },
    }
}

/// Source that plays back a fixed list of responses and counts calls.
/// Runs dry into `RetriesExceeded` once the script is exhausted.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<DashboardStats, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<DashboardStats, FetchError>>) -> Self {
        ScriptedSource {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsSource for ScriptedSource {
    async fn fetch_dashboard(&self) -> Result<DashboardStats, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Err(FetchError::RetriesExceeded))
    }
}

/// Source that parks every fetch until the test releases it, for exercising
/// in-flight coalescing.
pub struct GatedSource {
    stats: DashboardStats,
    started: Notify,
    gate: Semaphore,
    calls: AtomicUsize,
}

impl GatedSource {
    pub fn new(stats: DashboardStats) -> Self {
        GatedSource {
            stats,
            started: Notify::new(),
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsSource for GatedSource {
    async fn fetch_dashboard(&self) -> Result<DashboardStats, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| FetchError::RetriesExceeded)?;
        permit.forget();
        Ok(self.stats.clone())
    }
}
