use clap::{Parser, Subcommand};
use shared::metrics_defs::MetricType;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

mod config;
use config::{Config, MetricsConfig};

#[derive(Parser)]
#[command(name = "mindgate", about = "VPN control plane edge services")]
struct Cli {
    /// Path to the YAML config file. Defaults and environment variables
    /// apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the /api path router in front of the backend
    Gateway,
    /// Poll the backend dashboard snapshot and serve it to the UI
    Aggregator,
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load config: {err}");
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let _sentry_guard = config
        .common
        .logging
        .as_ref()
        .and_then(|logging| logging.sentry_dsn.as_deref())
        .map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    ..Default::default()
                },
            ))
        });

    if let Some(metrics_config) = &config.common.metrics
        && let Err(err) = init_metrics(metrics_config)
    {
        eprintln!("failed to initialize metrics: {err}");
        process::exit(1);
    }

    // Cooperative single-threaded model: cache mutation and timers run on
    // one control thread, suspension happens only at I/O boundaries.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        CliCommand::Gateway => {
            tracing::info!("starting gateway");
            runtime
                .block_on(gateway::run(config.gateway.unwrap_or_default()))
                .map_err(|err| err.to_string())
        }
        CliCommand::Aggregator => {
            tracing::info!("starting aggregator");
            runtime
                .block_on(aggregator::run(config.aggregator.unwrap_or_default()))
                .map_err(|err| err.to_string())
        }
    };

    if let Err(err) = result {
        eprintln!("fatal: {err}");
        process::exit(1);
    }
}

fn init_metrics(config: &MetricsConfig) -> Result<(), String> {
    let recorder = metrics_exporter_statsd::StatsdBuilder::from(&config.statsd_host, config.statsd_port)
        .build(Some("mindgate"))
        .map_err(|err| err.to_string())?;
    metrics::set_global_recorder(recorder).map_err(|err| err.to_string())?;

    for def in aggregator::metrics_defs::ALL_METRICS
        .iter()
        .chain(gateway::metrics_defs::ALL_METRICS)
    {
        match def.metric_type {
            MetricType::Counter => metrics::describe_counter!(def.name, def.description),
            MetricType::Gauge => metrics::describe_gauge!(def.name, def.description),
            MetricType::Histogram => metrics::describe_histogram!(def.name, def.description),
        }
    }

    Ok(())
}
