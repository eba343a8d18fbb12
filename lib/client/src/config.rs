use std::time::Duration;

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "OPENCRM_API_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Connection settings for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint is joined onto, without trailing slash.
    pub base_url: String,

    /// Fixed per-request deadline.
    pub timeout: Duration,

    /// Grace period between an authentication failure and session
    /// teardown, so in-flight views settle before state is wiped.
    pub teardown_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            teardown_delay: Duration::from_millis(200),
        }
    }
}

impl ClientConfig {
    /// Build from the environment, falling back to the local dev server.
    pub fn from_env() -> Self {
        Self::with_base(std::env::var(BASE_URL_ENV).ok())
    }

    fn with_base(base: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base) = base {
            let trimmed = base.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                config.base_url = trimmed.to_string();
            }
        }
        config
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn teardown_delay(mut self, delay: Duration) -> Self {
        self.teardown_delay = delay;
        self
    }
}
