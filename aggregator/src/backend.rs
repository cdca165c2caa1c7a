use crate::config::ConfigError;
use crate::stats::{DashboardStats, ValidationError};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tokio::time::{Duration, sleep};

const DASHBOARD_PATH: &str = "v1/metrics/dashboard";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Backoff schedule is 500ms then 1s, so a whole attempt stays well inside
// one poll period even with the request timeout on top.
const BASE_DELAY: u64 = 500;
const MAX_RETRIES: u32 = 2;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {0}")]
    Status(StatusCode),
    #[error("backend unavailable after retries")]
    RetriesExceeded,
    #[error("invalid dashboard payload: {0}")]
    Validation(#[from] ValidationError),
    #[error("a refresh is already in flight")]
    RefreshInFlight,
}

/// Source of dashboard snapshots. The cache only sees this trait, so tests
/// substitute a scripted source instead of a live backend.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_dashboard(&self) -> Result<DashboardStats, FetchError>;
}

pub struct Backend {
    client: reqwest::Client,
    dashboard_url: String,
}

impl Backend {
    /// Parses the base URL once. A malformed URL is a startup error, not a
    /// per-request one.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|err| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        let dashboard_url = format!("{}/{}", base_url.trim_end_matches('/'), DASHBOARD_PATH);
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Backend {
            client,
            dashboard_url,
        })
    }
}

#[async_trait]
impl StatsSource for Backend {
    async fn fetch_dashboard(&self) -> Result<DashboardStats, FetchError> {
        const RETRIABLE_STATUS_CODES: &[StatusCode] = &[
            StatusCode::TOO_MANY_REQUESTS,     // 429
            StatusCode::INTERNAL_SERVER_ERROR, // 500
            StatusCode::BAD_GATEWAY,           // 502
            StatusCode::SERVICE_UNAVAILABLE,   // 503
            StatusCode::GATEWAY_TIMEOUT,       // 504
        ];

        let mut retries = 0;

        loop {
            let response = match self.client.get(&self.dashboard_url).send().await {
                Ok(response) => response,
                // Timeouts and connect errors are as retriable as a 503
                Err(err) if retries < MAX_RETRIES => {
                    tracing::debug!(error = %err, "dashboard fetch failed, retrying");
                    backoff(&mut retries).await;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let status = response.status();
            if !status.is_success() {
                if RETRIABLE_STATUS_CODES.contains(&status) {
                    if retries < MAX_RETRIES {
                        backoff(&mut retries).await;
                        continue;
                    }
                    return Err(FetchError::RetriesExceeded);
                }
                return Err(FetchError::Status(status));
            }

            let stats = response.json::<DashboardStats>().await?;
            stats.validate()?;
            return Ok(stats);
        }
    }
}

async fn backoff(retries: &mut u32) {
    let delay = BASE_DELAY * 2_u64.pow(*retries);
    sleep(Duration::from_millis(delay)).await;
    *retries += 1;
}
