use crate::cache::{CacheStatus, StatsCache};
use crate::config::Listener as ListenerConfig;
use crate::stats::DashboardStats;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
struct AppState {
    cache: StatsCache,
    brand: Arc<str>,
}

pub async fn serve(
    listener: &ListenerConfig,
    cache: StatsCache,
    brand: String,
) -> Result<(), std::io::Error> {
    let state = AppState {
        cache,
        brand: brand.into(),
    };

    let app = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state);

    let addr = format!("{}:{}", listener.host, listener.port);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Serialize, Debug, PartialEq)]
struct DashboardResponse {
    brand: String,
    status: &'static str,
    stats: Option<DashboardStats>,
}

impl DashboardResponse {
    // `stats: null` with status "loading" is a cache that has never filled;
    // an all-zero stats object is real data. The two must stay
    // distinguishable on the wire.
    fn new(brand: &str, value: Option<Arc<DashboardStats>>, status: CacheStatus) -> Self {
        let status = match status {
            // A cold cache that has not started fetching yet still renders
            // as loading.
            CacheStatus::Idle => "loading",
            other => other.as_str(),
        };

        DashboardResponse {
            brand: brand.to_string(),
            status,
            stats: value.map(|v| (*v).clone()),
        }
    }
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let (value, status) = state.cache.get_stats();
    Json(DashboardResponse::new(&state.brand, value, status))
}

async fn health() -> &'static str {
    "ok\n"
}

async fn ready(State(state): State<AppState>) -> Response {
    match state.cache.get_stats().0 {
        Some(_) => StatusCode::OK.into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::sample_stats;

    #[test]
    fn test_cold_cache_renders_loading() {
        let response = DashboardResponse::new("MindVPN", None, CacheStatus::Idle);
        assert_eq!(response.status, "loading");
        assert!(response.stats.is_none());

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["status"], "loading");
        assert!(body["stats"].is_null());
    }

    #[test]
    fn test_fresh_snapshot_renders_values() {
        let response = DashboardResponse::new(
            "MindVPN",
            Some(Arc::new(sample_stats())),
            CacheStatus::Fresh,
        );
        assert_eq!(response.status, "fresh");

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["brand"], "MindVPN");
        assert_eq!(body["stats"]["nodes"]["online"], 3);
        assert_eq!(body["stats"]["tasks"]["failed"], 0);
    }

    #[test]
    fn test_error_with_retained_value_keeps_numbers() {
        let response = DashboardResponse::new(
            "MindVPN",
            Some(Arc::new(sample_stats())),
            CacheStatus::Error,
        );
        assert_eq!(response.status, "error");
        assert!(response.stats.is_some());
    }

    #[test]
    fn test_error_without_value_is_null_not_zero() {
        let response = DashboardResponse::new("MindVPN", None, CacheStatus::Error);
        assert_eq!(response.status, "error");

        let body = serde_json::to_value(&response).unwrap();
        assert!(body["stats"].is_null());
    }
}
