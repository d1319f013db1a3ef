//! Settings for a fleet compliance run

use std::time::Duration;

use crate::compare::MAX_UPTIME_TICKS;
use crate::error::CoreError;

/// Ticks (hundredths of a second) in one day
pub const TICKS_PER_DAY: u64 = 8_640_000;

/// Fleet run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetConfig {
    /// Devices checked in parallel
    pub concurrency: usize,
    /// Timeout for each live query
    pub query_timeout: Duration,
    /// Exclusive uptime bound in ticks
    pub max_uptime_ticks: u64,
    /// Cache resolved identifiers per device type
    pub cache_mappings: bool,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            query_timeout: Duration::from_secs(5),
            max_uptime_ticks: MAX_UPTIME_TICKS,
            cache_mappings: true,
        }
    }
}

impl FleetConfig {
    /// Set the uptime bound from a number of days
    #[must_use]
    pub fn with_max_uptime_days(mut self, days: u64) -> Self {
        self.max_uptime_ticks = days.saturating_mul(TICKS_PER_DAY);
        self
    }

    /// Check the settings are usable
    ///
    /// # Errors
    /// Returns a configuration error for a zero concurrency, timeout or
    /// uptime bound.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.concurrency == 0 {
            return Err(CoreError::ConfigError(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.query_timeout.is_zero() {
            return Err(CoreError::ConfigError(
                "query timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_uptime_ticks == 0 {
            return Err(CoreError::ConfigError(
                "maximum uptime must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uptime_is_one_year() {
        assert_eq!(FleetConfig::default().max_uptime_ticks, 365 * TICKS_PER_DAY);
        assert_eq!(
            FleetConfig::default().with_max_uptime_days(365),
            FleetConfig::default()
        );
    }

    #[test]
    fn test_validate() {
        assert!(FleetConfig::default().validate().is_ok());

        let zero = FleetConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(CoreError::ConfigError(_))));

        assert!(FleetConfig::default().with_max_uptime_days(0).validate().is_err());
    }
}
