use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
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
    pub paapi_access_key: Option<String>,
    pub paapi_secret_key: Option<String>,
    pub partner_tag: Option<String>,
    pub tag_suffix_enabled: bool,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub provider_request_timeout_secs: u64,
    pub provider_connect_timeout_secs: u64,
}

impl AppConfig {
    /// True when all three PAAPI credentials are present, i.e. the live
    /// provider client can be constructed at startup.
    #[must_use]
    pub fn provider_configured(&self) -> bool {
        self.paapi_access_key.is_some()
            && self.paapi_secret_key.is_some()
            && self.partner_tag.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "paapi_access_key",
                &self.paapi_access_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "paapi_secret_key",
                &self.paapi_secret_key.as_ref().map(|_| "[redacted]"),
            )
            .field("partner_tag", &self.partner_tag)
            .field("tag_suffix_enabled", &self.tag_suffix_enabled)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "provider_request_timeout_secs",
                &self.provider_request_timeout_secs,
            )
            .field(
                "provider_connect_timeout_secs",
                &self.provider_connect_timeout_secs,
            )
            .finish()
    }
}
