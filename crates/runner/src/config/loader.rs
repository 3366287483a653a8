use std::path::Path;
use tempo_scheduler::ConfigError;

use super::types::RunnerConfig;

/// Load runner configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<RunnerConfig, ConfigError> {
    let config: RunnerConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<RunnerConfig, ConfigError> {
    let default_config = include_str!("runner_config.json");
    load_config_from_str(default_config)
}

impl RunnerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler.validate()?;

        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.requests.is_empty() {
            return Err(ConfigError::Invalid("No requests in config".to_string()));
        }
        for request in &self.requests {
            if request.ticker().trim().is_empty() {
                return Err(ConfigError::Invalid("Request with empty ticker".to_string()));
            }
            if let Some(range) = request.range().filter(|range| range.is_inverted()) {
                return Err(ConfigError::Invalid(format!(
                    "Request for {} has start after end: {}",
                    request.ticker(),
                    range
                )));
            }
        }
        Ok(())
    }
}
