use aggregator::config::Config as AggregatorConfig;
use gateway::config::Config as GatewayConfig;
use serde::Deserialize;
use std::fs::File;

#[derive(Deserialize, Debug)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug)]
pub struct LoggingConfig {
    pub sentry_dsn: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub gateway: Option<GatewayConfig>,
    pub aggregator: Option<AggregatorConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: https://key@sentry.example.com/1
            gateway:
                listener:
                    host: 0.0.0.0
                    port: 3000
                api_base_url: https://ctl.example.com
            aggregator:
                api_base_url: https://ctl.example.com
                refresh_interval_secs: 30
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_port, 8125);

        let gateway = config.gateway.expect("gateway config");
        assert_eq!(gateway.api_base_url, "https://ctl.example.com");
        assert_eq!(gateway.listener.port, 3000);
        // Untouched sections keep their defaults
        assert_eq!(gateway.admin_listener.port, 3001);

        let aggregator = config.aggregator.expect("aggregator config");
        assert_eq!(aggregator.refresh_interval_secs, 30);
    }

    #[test]
    fn test_empty_config_has_no_sections() {
        let tmp = write_tmp_file("{}");
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(config.gateway.is_none());
        assert!(config.aggregator.is_none());
        assert!(config.common.metrics.is_none());
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let tmp = write_tmp_file("gateway: [not, a, mapping]");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let path = std::path::Path::new("/nonexistent/mindgate.yaml");
        assert!(matches!(
            Config::from_file(path),
            Err(ConfigError::LoadError(_))
        ));
    }
}
