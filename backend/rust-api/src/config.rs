use axum_extra::extract::cookie::SameSite;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub seed: SeedConfig,
    pub metrics: MetricsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed to call the API with the session cookie.
    /// Empty allows any origin, without credentials.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_seconds: i64,
    pub secure_cookie: bool,
    pub same_site: String,
    /// How often expired sessions are swept from memory.
    pub purge_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "pylearn_sid".to_string(),
            ttl_seconds: 86_400,
            secure_cookie: false,
            same_site: "lax".to_string(),
            purge_interval_seconds: 300,
        }
    }
}

impl SessionConfig {
    pub fn parse_same_site(&self) -> SameSite {
        match self.same_site.to_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Populate the store with the demo user and curriculum on start-up.
    pub sample_data: bool,
    /// Optional JSON file of extra records, loaded after the sample data.
    pub fixtures_file: Option<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            sample_data: true,
            fixtures_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Basic auth credentials for /metrics, as `username:password`.
    pub auth: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            auth: "admin:changeme".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml first, APP__SECTION__KEY variables on top
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let mut loaded: Config = settings.try_deserialize()?;

        // PORT is what most hosting platforms hand us
        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            loaded.server.port = port;
        }

        if env == "prod" && loaded.metrics.auth == MetricsConfig::default().auth {
            tracing::warn!("Using default metrics credentials in production");
        }

        Ok(loaded)
    }
}
