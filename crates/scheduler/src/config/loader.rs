use std::path::Path;
use thiserror::Error;

use super::types::SchedulerConfig;
use crate::partition::DAYS_PER_YEAR;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load scheduler configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SchedulerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<SchedulerConfig, ConfigError> {
    let config: SchedulerConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<SchedulerConfig, ConfigError> {
    let default_config = include_str!("scheduler_config.json");
    load_config_from_str(default_config)
}

impl SchedulerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pacer_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "pacer_interval_ms must be greater than zero".to_string(),
            ));
        }
        // Day-granular calls stop at a year and the years chunk counts whole
        // years, so no other threshold leaves every span fetchable
        if self.partition_threshold_days != DAYS_PER_YEAR {
            return Err(ConfigError::Invalid(format!(
                "partition_threshold_days must be {}, got {}",
                DAYS_PER_YEAR, self.partition_threshold_days
            )));
        }
        // The days chunk must end inside the years chunk
        if !(1..self.partition_threshold_days).contains(&self.partition_cushion_days) {
            return Err(ConfigError::Invalid(format!(
                "partition_cushion_days must be between 1 and {}, got {}",
                self.partition_threshold_days - 1,
                self.partition_cushion_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tempo_core::BarSize;

    #[test]
    fn test_load_default_config() {
        let config = load_default_config().unwrap();
        assert_eq!(config, SchedulerConfig::default());
        assert_eq!(config.pacer_interval(), Duration::from_secs(1));
        assert_eq!(
            config.early_date_floor,
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = load_config_from_str(r#"{ "pacer_interval_ms": 250, "bar_size": "1 hour" }"#)
            .unwrap();
        assert_eq!(config.pacer_interval_ms, 250);
        assert_eq!(config.bar_size, BarSize::OneHour);
        assert_eq!(config.partition_threshold_days, 365);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let result = load_config_from_str(r#"{ "pacer_interval_ms": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_threshold_beyond_a_year() {
        let result = load_config_from_str(r#"{ "partition_threshold_days": 400 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_threshold_below_a_year() {
        let result = load_config_from_str(r#"{ "partition_threshold_days": 200 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_cushion_bounds() {
        let zero = load_config_from_str(r#"{ "partition_cushion_days": 0 }"#);
        assert!(matches!(zero, Err(ConfigError::Invalid(_))));

        let too_long = load_config_from_str(r#"{ "partition_cushion_days": 365 }"#);
        assert!(matches!(too_long, Err(ConfigError::Invalid(_))));

        let widest = load_config_from_str(r#"{ "partition_cushion_days": 364 }"#).unwrap();
        assert_eq!(widest.partition().cushion_days, 364);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/scheduler.json");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
