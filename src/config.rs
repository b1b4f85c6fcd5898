//! Engine configuration.

use crate::types::{DEFAULT_TICK_INTERVAL_MS, MAX_EXECUTION_STEPS, MAX_PROGRAM_SIZE};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Delay between two automatic steps in Run mode.
    pub tick_interval: Duration,
    /// Step budget for `run_to_halt`.
    pub max_steps: usize,
    /// Upper bound, in bytes, for textual program imports.
    pub max_program_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            max_steps: MAX_EXECUTION_STEPS,
            max_program_size: MAX_PROGRAM_SIZE,
        }
    }
}

impl Config {
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_constants() {
        let config = Config::default();
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.max_steps, 10000);
        assert_eq!(config.max_program_size, 65536);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_tick_interval(Duration::from_millis(5))
            .with_max_steps(3);
        assert_eq!(config.tick_interval, Duration::from_millis(5));
        assert_eq!(config.max_steps, 3);
    }
}
