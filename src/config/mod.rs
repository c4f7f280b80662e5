// Configuration module entry point
// Manages application configuration and shared request state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, GatewayConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

impl Config {
    /// Load configuration from "config.toml" plus environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SENTIMENT").separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("gateway.account_id", "")?
            .set_default("gateway.api_token", "")?
            .set_default("gateway.api_base", "https://api.cloudflare.com/client/v4")?
            .set_default("gateway.model", "@cf/meta/llama-3.3-70b-instruct-fp8-fast")?
            .set_default("gateway.request_timeout", 60)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            // A /sentiment batch holds the connection through one gateway
            // call per tweet, so these must comfortably exceed
            // gateway.request_timeout
            .set_default("performance.read_timeout", 300)?
            .set_default("performance.write_timeout", 300)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Per-connection timeout applied around request serving
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }

    /// Whether the connection timeout can outlast a single gateway call.
    /// When it cannot, a slow model call gets the connection severed
    /// mid-request instead of producing a JSON response.
    pub fn connection_timeout_covers_gateway(&self) -> bool {
        self.connection_timeout() > Duration::from_secs(self.gateway.request_timeout)
    }
}
