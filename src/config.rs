//! Environment-driven configuration

use std::time::Duration;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub port: u16,
    /// Base URL of the chat platform's messaging API.
    pub platform_base_url: String,
    pub platform_token: String,
    /// API key for the generative backend.
    pub backend_api_key: String,
    /// Override for the backend base URL (proxies, gateways).
    pub backend_base_url: Option<String>,
    /// Outbound HTTP timeout for both the platform and the backend.
    pub request_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("CARDBOT_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(9000);

        let timeout_secs = std::env::var("CARDBOT_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(110);

        Self {
            port,
            platform_base_url: std::env::var("CARDBOT_PLATFORM_URL")
                .unwrap_or_else(|_| "https://open.feishu.cn/open-apis".to_string()),
            platform_token: std::env::var("CARDBOT_PLATFORM_TOKEN").unwrap_or_default(),
            backend_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            backend_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn has_backend_key(&self) -> bool {
        !self.backend_api_key.is_empty()
    }
}
