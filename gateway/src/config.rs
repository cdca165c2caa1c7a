use serde::Deserialize;

fn default_api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn default_admin_listener() -> Listener {
    Listener {
        host: "127.0.0.1".into(),
        port: 3001,
    }
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
            port: 3000,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    #[serde(default = "default_admin_listener")]
    pub admin_listener: Listener,
    /// Backend base URL. Falls back to the API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            admin_listener: default_admin_listener(),
            api_base_url: default_api_base_url(),
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
    port: 8080
admin_listener:
    host: "127.0.0.1"
    port: 8081
api_base_url: https://ctl.example.com
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.admin_listener.port, 8081);
        assert_eq!(config.api_base_url, "https://ctl.example.com");
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = serde_yaml::from_str("api_base_url: http://10.0.0.1:8000").unwrap();
        assert_eq!(config.listener, Listener::default());
        assert_eq!(config.admin_listener.port, 3001);
        assert_eq!(config.api_base_url, "http://10.0.0.1:8000");
    }
}
