pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod metrics_defs;
pub mod scheduler;
pub mod stats;

#[cfg(test)]
mod testutils;

use crate::backend::Backend;
use crate::cache::StatsCache;
use crate::config::ConfigError;
use crate::scheduler::RefreshTask;
use std::sync::Arc;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum AggregatorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the backend client and cache, starts the periodic refresh task and
/// serves the dashboard API. The backend URL is validated here so a bad
/// value aborts startup instead of failing on the first poll.
pub async fn run(config: config::Config) -> Result<(), AggregatorError> {
    let period = Duration::from_secs(config.refresh_interval_secs);
    let backend = Backend::new(&config.api_base_url)?;
    let cache = StatsCache::new(Arc::new(backend), period);

    let refresh_task = RefreshTask::spawn(cache.clone(), period);

    let result = api::serve(&config.listener, cache, config.brand).await;

    // The API listener is gone, stop polling a cache nobody observes.
    refresh_task.stop().await;
    result?;
    Ok(())
}
