//! Configuration module

use anyhow::Context;
use serde::Deserialize;

pub const MISSING_CREDENTIALS: &str =
    "Please set TPLINK_USERNAME and TPLINK_PASSWORD in .env file";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cloud: CloudConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Kasa cloud account settings
#[derive(Debug, Clone, Deserialize)]
pub struct CloudConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_app_type")]
    pub app_type: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            app_type: default_app_type(),
            username: String::new(),
            password: String::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_base_url() -> String {
    "https://wap.tplinkcloud.com".to_string()
}

fn default_app_type() -> String {
    "Kasa_Android".to_string()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // .env is optional; real environment variables win
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }

        Self::from_sources(
            config::File::with_name("config/default").required(false),
            None,
            std::env::var("TPLINK_USERNAME").ok(),
            std::env::var("TPLINK_PASSWORD").ok(),
        )
    }

    /// Layer `file` < `KASA_GATEWAY__*` env < credential overrides, then validate.
    /// `env` replaces the process environment when given.
    fn from_sources<F>(
        file: F,
        env: Option<config::Map<String, String>>,
        username: Option<String>,
        password: Option<String>,
    ) -> anyhow::Result<Self>
    where
        F: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("KASA_GATEWAY")
                    .separator("__")
                    .source(env),
            )
            .set_override_option("cloud.username", username)?
            .set_override_option("cloud.password", password)?
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.cloud.username.is_empty() || self.cloud.password.is_empty() {
            anyhow::bail!(MISSING_CREDENTIALS);
        }

        url::Url::parse(&self.cloud.base_url)
            .with_context(|| format!("Invalid cloud.base_url '{}'", self.cloud.base_url))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(username: &str, password: &str, base_url: &str) -> Config {
        Config {
            server: ServerConfig::default(),
            cloud: CloudConfig {
                base_url: base_url.to_string(),
                username: username.to_string(),
                password: password.to_string(),
                ..CloudConfig::default()
            },
        }
    }

    #[test]
    fn test_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8000);

        let cloud = CloudConfig::default();
        assert_eq!(cloud.base_url, "https://wap.tplinkcloud.com");
        assert_eq!(cloud.app_type, "Kasa_Android");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"server":{"port":9000},"cloud":{"username":"u"}}"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cloud.username, "u");
        assert_eq!(config.cloud.base_url, "https://wap.tplinkcloud.com");
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = config_with("", "secret", "https://wap.tplinkcloud.com")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains(MISSING_CREDENTIALS));

        assert!(config_with("user@example.com", "", "https://wap.tplinkcloud.com")
            .validate()
            .is_err());
    }

    const FILE: &str = r#"
        [server]
        port = 9000

        [cloud]
        base_url = "https://eu-wap.tplinkcloud.com"
        username = "file@example.com"
        password = "file-secret"
    "#;

    fn file() -> config::File<config::FileSourceString, config::FileFormat> {
        config::File::from_str(FILE, config::FileFormat::Toml)
    }

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_file_values_used() {
        let config = Config::from_sources(file(), env(&[]), None, None).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cloud.base_url, "https://eu-wap.tplinkcloud.com");
        assert_eq!(config.cloud.username, "file@example.com");
        assert_eq!(config.cloud.app_type, "Kasa_Android");
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config::from_sources(
            file(),
            env(&[
                ("KASA_GATEWAY__SERVER__PORT", "9100"),
                ("KASA_GATEWAY__SERVER__HOST", "127.0.0.1"),
                ("OTHER__SERVER__PORT", "1"),
            ]),
            None,
            None,
        )
        .unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_credential_overrides_win() {
        let config = Config::from_sources(
            file(),
            env(&[("KASA_GATEWAY__CLOUD__USERNAME", "env@example.com")]),
            Some("tplink@example.com".to_string()),
            Some("tplink-secret".to_string()),
        )
        .unwrap();
        assert_eq!(config.cloud.username, "tplink@example.com");
        assert_eq!(config.cloud.password, "tplink-secret");

        // Only the given override applies; the rest still comes from lower layers
        let config = Config::from_sources(
            file(),
            env(&[]),
            None,
            Some("tplink-secret".to_string()),
        )
        .unwrap();
        assert_eq!(config.cloud.username, "file@example.com");
        assert_eq!(config.cloud.password, "tplink-secret");
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::from_sources(
            config::File::from_str("", config::FileFormat::Toml),
            env(&[]),
            Some("user@example.com".to_string()),
            Some("secret".to_string()),
        )
        .unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.cloud.base_url, "https://wap.tplinkcloud.com");
    }

    #[test]
    fn test_missing_credentials_fail_load() {
        let err = Config::from_sources(
            config::File::from_str("", config::FileFormat::Toml),
            env(&[]),
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains(MISSING_CREDENTIALS));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(config_with("user@example.com", "secret", "not a url")
            .validate()
            .is_err());
        assert!(config_with("user@example.com", "secret", "https://wap.tplinkcloud.com")
            .validate()
            .is_ok());
    }
}
