// Application state module
// Read-only state shared across request handlers

use crate::gateway;

use super::types::Config;

/// Application state
///
/// Holds the loaded configuration and the model gateway client. Nothing
/// here is mutated after startup; per-request values never outlive their
/// request.
pub struct AppState {
    pub config: Config,
    pub gateway: gateway::Client,
}

impl AppState {
    /// Create `AppState` with a gateway client built from the config
    pub fn new(config: Config) -> Result<Self, gateway::Error> {
        let gateway = gateway::Client::new(&config.gateway)?;
        Ok(Self { config, gateway })
    }
}
