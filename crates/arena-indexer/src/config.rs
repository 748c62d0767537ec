//! Configuration for reconciliation and batch runs.
//!
//! # Environment Variables
//!
//! - `ARENA_TZ_THRESHOLD`: share of matched games that must agree on the
//!   venue offset, in `(0, 1]` (default: 0.6)
//! - `ARENA_PRICE_UNLISTED`: set to `false` or `0` to leave stored games that
//!   are missing from the table untouched (default: enabled)
//! - `ARENA_BATCH_CONCURRENCY`: teams reconciled at once (default: 1)
//! - `ARENA_REQUEST_DELAY_MS`: pause before each page fetch (default: 1500)

use crate::error::IndexerError;
use arena_ingestion::TableLayout;
use std::env;
use std::time::Duration;

/// Default agreement share for timezone detection.
pub const DEFAULT_TIMEZONE_THRESHOLD: f64 = 0.6;

/// Default pause before fetching each team's page.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1500);

/// Configuration for [`ReconciliationService`](crate::ReconciliationService).
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Layout of the attendance table.
    pub layout: TableLayout,

    /// Minimum share of matched games supporting the detected offset.
    pub timezone_threshold: f64,

    /// Price stored home games missing from the table by date.
    pub price_unlisted_games: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            layout: TableLayout::default(),
            timezone_threshold: DEFAULT_TIMEZONE_THRESHOLD,
            price_unlisted_games: true,
        }
    }
}

impl ReconcilerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self {
            layout: TableLayout::from_env(),
            ..Self::default()
        };

        if let Some(threshold) = env::var("ARENA_TZ_THRESHOLD").ok().and_then(|s| s.trim().parse::<f64>().ok()) {
            if threshold > 0.0 && threshold <= 1.0 {
                config.timezone_threshold = threshold;
            } else {
                tracing::warn!("ignoring ARENA_TZ_THRESHOLD={} (must be in (0, 1])", threshold);
            }
        }

        if let Ok(flag) = env::var("ARENA_PRICE_UNLISTED") {
            config.price_unlisted_games = !matches!(flag.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off");
        }

        config
    }

    pub fn with_layout(mut self, layout: TableLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_timezone_threshold(mut self, threshold: f64) -> Self {
        self.timezone_threshold = threshold;
        self
    }

    pub fn with_unlisted_pricing(mut self, enabled: bool) -> Self {
        self.price_unlisted_games = enabled;
        self
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), IndexerError> {
        if !(self.timezone_threshold > 0.0 && self.timezone_threshold <= 1.0) {
            return Err(IndexerError::Config(format!(
                "timezone threshold {} outside (0, 1]",
                self.timezone_threshold
            )));
        }
        Ok(())
    }
}

/// Configuration for [`BatchReconciler`](crate::BatchReconciler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Teams reconciled at the same time.
    pub max_concurrent_teams: usize,

    /// Pause before each page fetch.
    pub request_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_teams: 1,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

impl BatchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_concurrent_teams = env::var("ARENA_BATCH_CONCURRENCY")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_concurrent_teams);
        let request_delay = env::var("ARENA_REQUEST_DELAY_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_delay);

        Self {
            max_concurrent_teams,
            request_delay,
        }
    }

    /// Set the concurrency; values below 1 are treated as 1.
    pub fn with_max_concurrent_teams(mut self, n: usize) -> Self {
        self.max_concurrent_teams = n.max(1);
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.timezone_threshold, 0.6);
        assert!(config.price_unlisted_games);
        assert!(config.validate().is_ok());

        let batch = BatchConfig::default();
        assert_eq!(batch.max_concurrent_teams, 1);
        assert_eq!(batch.request_delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(ReconcilerConfig::default().with_timezone_threshold(0.0).validate().is_err());
        assert!(ReconcilerConfig::default().with_timezone_threshold(1.5).validate().is_err());
        assert!(ReconcilerConfig::default().with_timezone_threshold(f64::NAN).validate().is_err());
        assert!(ReconcilerConfig::default().with_timezone_threshold(1.0).validate().is_ok());
    }

    #[test]
    fn test_batch_concurrency_floor() {
        assert_eq!(BatchConfig::default().with_max_concurrent_teams(0).max_concurrent_teams, 1);
    }
}
