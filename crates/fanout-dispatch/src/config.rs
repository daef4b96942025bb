use std::time::Duration;

use crate::error::{DispatchError, DispatchResult};

/// Lowest accepted concurrency bound
pub const MIN_PARALLEL_JOBS: usize = 1;

/// Highest accepted concurrency bound
pub const MAX_PARALLEL_JOBS: usize = 50;

/// Configuration for batch transfer dispatch
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum number of retry attempts after the initial try
    pub max_retries: u32,

    /// Base wait between attempts; attempt n waits n times this interval
    pub backoff_interval: Duration,

    /// Maximum number of jobs executing at the same time
    pub max_parallel: usize,

    /// Percentage added on top of every gas estimate
    pub gas_headroom_percent: u64,

    /// Gas limit used when estimation fails (a plain value transfer costs 21000)
    pub fallback_gas_limit: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_retries: 4,
            backoff_interval: Duration::from_millis(1000),
            max_parallel: 4,
            gas_headroom_percent: 10,
            fallback_gas_limit: 21_000,
        }
    }
}

impl DispatchConfig {
    /// Check that the configuration is usable before any job starts
    pub fn validate(&self) -> DispatchResult<()> {
        if self.max_parallel < MIN_PARALLEL_JOBS || self.max_parallel > MAX_PARALLEL_JOBS {
            return Err(DispatchError::Config(format!(
                "max_parallel must be between {} and {}, got {}",
                MIN_PARALLEL_JOBS, MAX_PARALLEL_JOBS, self.max_parallel
            )));
        }
        Ok(())
    }

    /// Apply the configured headroom to a gas estimate
    pub fn apply_headroom(&self, gas: u64) -> u64 {
        gas.saturating_add(gas.saturating_mul(self.gas_headroom_percent) / 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatchConfig::default();
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.backoff_interval, Duration::from_millis(1000));
        assert_eq!(config.max_parallel, 4);
        assert_eq!(config.fallback_gas_limit, 21_000);
        config.validate().unwrap();
    }

    #[test]
    fn test_parallelism_bounds() {
        let mut config = DispatchConfig::default();

        config.max_parallel = 0;
        assert!(config.validate().is_err());

        config.max_parallel = 51;
        assert!(config.validate().is_err());

        config.max_parallel = 1;
        config.validate().unwrap();

        config.max_parallel = 50;
        config.validate().unwrap();
    }

    #[test]
    fn test_headroom_application() {
        let config = DispatchConfig {
            gas_headroom_percent: 10,
            ..Default::default()
        };
        assert_eq!(config.apply_headroom(21_000), 23_100);
        assert_eq!(config.apply_headroom(0), 0);

        let flat = DispatchConfig {
            gas_headroom_percent: 0,
            ..Default::default()
        };
        assert_eq!(flat.apply_headroom(21_000), 21_000);
    }
}
