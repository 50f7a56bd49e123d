//! Tunables for a chat session.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default watcher poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default relay capacity (pending diffs between watcher and session).
pub const DEFAULT_RELAY_CAPACITY: usize = 32;

/// Poll intervals to wait for the watcher before cancelling it explicitly.
pub const DEFAULT_SHUTDOWN_GRACE_TICKS: u32 = 3;

/// Poll intervals after which a watcher that has not exited is an error.
pub const DEFAULT_SHUTDOWN_LIMIT_TICKS: u32 = 10;

/// Consecutive store failures the watcher tolerates before stopping.
pub const DEFAULT_MAX_STORE_FAILURES: u32 = 5;

/// Blank lines printed before relayed content.
pub const DEFAULT_CLEAR_LINES: usize = 25;

/// Session configuration shared by the coordinator and the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Watcher poll interval; also the coordinator's shutdown retry interval.
    pub poll_interval: Duration,
    /// Bounded relay capacity.
    pub relay_capacity: usize,
    /// Intervals before the watcher's cancellation handle is tripped.
    pub shutdown_grace_ticks: u32,
    /// Intervals before shutdown fails with `WatcherStuck`.
    pub shutdown_limit_ticks: u32,
    /// Consecutive store failures tolerated by the watcher.
    pub max_store_failures: u32,
    /// Blank lines printed to clear the screen region before relayed content.
    pub clear_lines: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            relay_capacity: DEFAULT_RELAY_CAPACITY,
            shutdown_grace_ticks: DEFAULT_SHUTDOWN_GRACE_TICKS,
            shutdown_limit_ticks: DEFAULT_SHUTDOWN_LIMIT_TICKS,
            max_store_failures: DEFAULT_MAX_STORE_FAILURES,
            clear_lines: DEFAULT_CLEAR_LINES,
        }
    }
}

impl ChatConfig {
    /// Returns the default configuration with a different poll interval.
    #[must_use]
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..Self::default()
        }
    }

    /// Checks the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(config_error("poll interval must be greater than zero"));
        }
        if self.relay_capacity == 0 {
            return Err(config_error("relay capacity must be at least 1"));
        }
        if self.max_store_failures == 0 {
            return Err(config_error("max store failures must be at least 1"));
        }
        if self.shutdown_grace_ticks >= self.shutdown_limit_ticks {
            return Err(config_error(&format!(
                "shutdown grace ({}) must be below the shutdown limit ({})",
                self.shutdown_grace_ticks, self.shutdown_limit_ticks
            )));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = ChatConfig::with_poll_interval(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll interval"));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = ChatConfig {
            relay_capacity: 0,
            ..ChatConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_grace_must_be_below_limit() {
        let config = ChatConfig {
            shutdown_grace_ticks: 10,
            shutdown_limit_ticks: 10,
            ..ChatConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
