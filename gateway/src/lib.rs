pub mod config;
mod errors;
mod headers;
pub mod metrics_defs;
mod router_service;
mod upstream;

pub use errors::GatewayError;

use router_service::RouterService;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use upstream::Upstream;

/// Resolves the backend upstream once and serves the router and admin
/// listeners. A malformed base URL fails here, before any socket is bound.
pub async fn run(config: config::Config) -> Result<(), GatewayError> {
    let upstream = Upstream::parse(&config.api_base_url)?;
    tracing::info!(upstream = %config.api_base_url, "forwarding /api requests");

    let router = RouterService::try_new(upstream)?;
    let admin = AdminService::<_, GatewayError>::new(|| true);

    let router_task = run_http_service(&config.listener.host, config.listener.port, router);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin,
    );

    tokio::try_join!(router_task, admin_task)?;
    Ok(())
}
