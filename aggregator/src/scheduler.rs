use crate::backend::FetchError;
use crate::cache::StatsCache;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Commands accepted by the refresh worker.
#[derive(Debug)]
pub enum Command {
    /// Refresh ahead of the next tick. The worker reports the attempt's
    /// outcome on the enclosed channel.
    Refresh(oneshot::Sender<Result<(), FetchError>>),
    Shutdown,
}

#[derive(thiserror::Error, Debug)]
pub enum ScheduleError {
    #[error("refresh worker is not running")]
    WorkerStopped,
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Periodic refresh driver for a stats cache. Owns the timer so the cache
/// stays passive; dropping the handle aborts the worker, which also cancels
/// any in-flight fetch before it can write back.
pub struct RefreshTask {
    handle: Option<JoinHandle<()>>,
    tx: mpsc::Sender<Command>,
}

impl RefreshTask {
    pub fn spawn(cache: StatsCache, period: Duration) -> Self {
        let (tx, mut rx) = mpsc::channel::<Command>(16);

        let handle = tokio::spawn(async move {
            // The first tick fires immediately and performs the cold fetch.
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => match cache.refresh().await {
                        Ok(_) => {}
                        Err(FetchError::RefreshInFlight) => {
                            tracing::debug!("refresh tick coalesced, previous fetch still running");
                        }
                        Err(err) => tracing::warn!(error = %err, "scheduled refresh failed"),
                    },
                    cmd = rx.recv() => match cmd {
                        Some(Command::Refresh(done)) => {
                            let result = cache.refresh().await.map(|_| ());
                            let _ = done.send(result);
                        }
                        Some(Command::Shutdown) | None => break,
                    },
                }
            }
        });

        RefreshTask {
            handle: Some(handle),
            tx,
        }
    }

    /// Requests a refresh ahead of the next tick and waits for the attempt.
    pub async fn refresh_now(&self) -> Result<(), ScheduleError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Command::Refresh(done_tx))
            .await
            .map_err(|_| ScheduleError::WorkerStopped)?;
        done_rx.await.map_err(|_| ScheduleError::WorkerStopped)??;
        Ok(())
    }

    /// Stops the worker after its current iteration and waits for it.
    pub async fn stop(mut self) {
        let _ = self.tx.send(Command::Shutdown).await;
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        // Cuts off late cache writes once nobody holds the handle.
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}
