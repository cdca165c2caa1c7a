use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid backend base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

fn default_api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn default_brand() -> String {
    std::env::var("BRAND_NAME").unwrap_or_else(|_| "MindVPN".to_string())
}

fn default_refresh_interval_secs() -> u64 {
    30
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3100,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    /// Backend base URL. Falls back to the API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Poll period for the dashboard snapshot, which doubles as the
    /// staleness bound.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Cosmetic deployment name echoed to the UI. Falls back to BRAND_NAME.
    #[serde(default = "default_brand")]
    pub brand: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            api_base_url: default_api_base_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            brand: default_brand(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
listener:
    host: "0.0.0.0"
    port: 9100
api_base_url: https://ctl.example.com
refresh_interval_secs: 15
brand: AcmeVPN
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listener.port, 9100);
        assert_eq!(config.api_base_url, "https://ctl.example.com");
        assert_eq!(config.refresh_interval_secs, 15);
        assert_eq!(config.brand, "AcmeVPN");
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = serde_yaml::from_str("api_base_url: http://10.0.0.1:8000").unwrap();
        assert_eq!(config.listener, Listener::default());
        assert_eq!(config.refresh_interval_secs, 30);
        assert!(!config.brand.is_empty());
    }
}
