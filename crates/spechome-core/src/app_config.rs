use std::net::SocketAddr;
use std::path::PathBuf;

use crate::source::PagePolicy;

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
    pub rapidapi_key: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Region YAML; the built-in Oak Brook region is used when unset.
    pub region_path: Option<PathBuf>,
    pub listings_base_url: String,
    pub listings_timeout_secs: u64,
    pub listings_user_agent: String,
    pub listings_max_retries: u32,
    pub listings_retry_backoff_base_secs: u64,
    pub page_size: usize,
    pub nearby_max_pages: u32,
    pub analyze_comp_limit: usize,
    pub session_idle_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn page_policy(&self) -> PagePolicy {
        PagePolicy {
            page_size: self.page_size,
            max_pages: self.nearby_max_pages,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("rapidapi_key", &"[redacted]")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("region_path", &self.region_path)
            .field("listings_base_url", &self.listings_base_url)
            .field("listings_timeout_secs", &self.listings_timeout_secs)
            .field("listings_user_agent", &self.listings_user_agent)
            .field("listings_max_retries", &self.listings_max_retries)
            .field(
                "listings_retry_backoff_base_secs",
                &self.listings_retry_backoff_base_secs,
            )
            .field("page_size", &self.page_size)
            .field("nearby_max_pages", &self.nearby_max_pages)
            .field("analyze_comp_limit", &self.analyze_comp_limit)
            .field("session_idle_secs", &self.session_idle_secs)
            .finish()
    }
}
