use std::net::SocketAddr;

/// Secret used when `TRENDSCOPE_SECRET_KEY` is unset outside production.
pub const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub secret_key: String,
    pub cors_origin: String,
    pub youtube_api_key: Option<String>,
    pub instagram_access_token: Option<String>,
    pub youtube_category_id: String,
    pub youtube_region_code: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub collector_max_results: u32,
    pub collector_request_timeout_secs: u64,
    pub collector_user_agent: String,
    pub collector_retry_backoff_ms: u64,
    /// Text-analysis assistant settings. Carried through to the dashboard
    /// untouched; nothing in the service acts on them.
    pub assistant_enabled: bool,
    pub assistant_model: String,
    pub assistant_context_size: u32,
}

impl AppConfig {
    /// Returns a copy of this config with `bind_addr` moved to `port`.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &self.database_url)
            .field("secret_key", &"[redacted]")
            .field("cors_origin", &self.cors_origin)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "instagram_access_token",
                &self.instagram_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("youtube_category_id", &self.youtube_category_id)
            .field("youtube_region_code", &self.youtube_region_code)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("collector_max_results", &self.collector_max_results)
            .field(
                "collector_request_timeout_secs",
                &self.collector_request_timeout_secs,
            )
            .field("collector_user_agent", &self.collector_user_agent)
            .field(
                "collector_retry_backoff_ms",
                &self.collector_retry_backoff_ms,
            )
            .field("assistant_enabled", &self.assistant_enabled)
            .field("assistant_model", &self.assistant_model)
            .field("assistant_context_size", &self.assistant_context_size)
            .finish()
    }
}
