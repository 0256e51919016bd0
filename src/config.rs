// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for event history fetching.
//!
//! Controls the provider-facing knobs: window size, pacing between
//! windows, the retry policy, and the watch polling intervals.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use event_history::EventHistoryConfig;
//!
//! // 100k-block windows, 400ms pacing, 5 retry attempts
//! let config = EventHistoryConfig::default();
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use event_history::EventHistoryConfigBuilder;
//! use std::time::Duration;
//!
//! let config = EventHistoryConfigBuilder::new()
//!     .max_window(10_000)
//!     .window_pacing(Duration::from_millis(250))
//!     .polling_interval(Duration::from_secs(12))
//!     .build();
//! ```

use std::{collections::HashSet, time::Duration};

use crate::{retry::RetryPolicy, window::MaxWindow};

/// Chain id used by hardhat and anvil development nodes.
pub const LOCAL_DEV_CHAIN_ID: u64 = 31_337;

/// Default production polling interval for watch mode (30s).
const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(30);
/// Polling interval on local development chains (4s).
const DEFAULT_LOCAL_POLLING_INTERVAL: Duration = Duration::from_secs(4);
/// Pause between consecutive window fetches (400ms).
const DEFAULT_WINDOW_PACING: Duration = Duration::from_millis(400);

/// Configuration for the fetcher and the watch lifecycle.
///
/// Use [`EventHistoryConfigBuilder`] for a fluent API to construct
/// instances.
#[derive(Debug, Clone)]
pub struct EventHistoryConfig {
    /// Maximum blocks per `eth_getLogs` call.
    /// Default: 100,000 (common public-endpoint cap).
    pub max_window: MaxWindow,

    /// Pause between consecutive window fetches, applied regardless of
    /// retry activity to stay under provider request-rate ceilings.
    /// Default: 400ms.
    pub window_pacing: Duration,

    /// Backoff schedule for failed window fetches.
    pub retry: RetryPolicy,

    /// Watch polling interval on production networks.
    /// Default: 30 seconds.
    pub polling_interval: Duration,

    /// Watch polling interval on local development networks, where
    /// blocks arrive fast and rate limits do not apply.
    /// Default: 4 seconds.
    pub local_polling_interval: Duration,

    /// Chain ids treated as local development networks.
    pub local_chain_ids: HashSet<u64>,
}

impl Default for EventHistoryConfig {
    fn default() -> Self {
        Self {
            max_window: MaxWindow::DEFAULT,
            window_pacing: DEFAULT_WINDOW_PACING,
            retry: RetryPolicy::default(),
            polling_interval: DEFAULT_POLLING_INTERVAL,
            local_polling_interval: DEFAULT_LOCAL_POLLING_INTERVAL,
            local_chain_ids: HashSet::from([LOCAL_DEV_CHAIN_ID]),
        }
    }
}

impl EventHistoryConfig {
    /// Effective watch polling interval for a chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use event_history::{EventHistoryConfig, LOCAL_DEV_CHAIN_ID};
    /// use std::time::Duration;
    ///
    /// let config = EventHistoryConfig::default();
    /// assert_eq!(
    ///     config.polling_interval_for(LOCAL_DEV_CHAIN_ID),
    ///     Duration::from_secs(4)
    /// );
    /// assert_eq!(config.polling_interval_for(1), Duration::from_secs(30));
    /// ```
    pub fn polling_interval_for(&self, chain_id: u64) -> Duration {
        if self.local_chain_ids.contains(&chain_id) {
            self.local_polling_interval
        } else {
            self.polling_interval
        }
    }
}

/// Builder for [`EventHistoryConfig`].
#[derive(Debug, Clone, Default)]
pub struct EventHistoryConfigBuilder {
    config: EventHistoryConfig,
}

impl EventHistoryConfigBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum blocks per log query.
    pub fn max_window(mut self, blocks: u64) -> Self {
        self.config.max_window = MaxWindow::new(blocks);
        self
    }

    /// Set the pause between consecutive window fetches.
    pub fn window_pacing(mut self, pacing: Duration) -> Self {
        self.config.window_pacing = pacing;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the production watch polling interval.
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.config.polling_interval = interval;
        self
    }

    /// Set the local-network watch polling interval.
    pub fn local_polling_interval(mut self, interval: Duration) -> Self {
        self.config.local_polling_interval = interval;
        self
    }

    /// Treat a chain id as a local development network.
    pub fn local_chain_id(mut self, chain_id: u64) -> Self {
        self.config.local_chain_ids.insert(chain_id);
        self
    }

    /// Build the configured [`EventHistoryConfig`].
    pub fn build(self) -> EventHistoryConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EventHistoryConfig::default();

        assert_eq!(config.max_window.as_u64(), 100_000);
        assert_eq!(config.window_pacing, Duration::from_millis(400));
        assert_eq!(config.polling_interval, Duration::from_secs(30));
        assert_eq!(config.local_polling_interval, Duration::from_secs(4));
        assert!(config.local_chain_ids.contains(&LOCAL_DEV_CHAIN_ID));
    }

    #[test]
    fn test_polling_interval_selection() {
        let config = EventHistoryConfig::default();

        assert_eq!(
            config.polling_interval_for(LOCAL_DEV_CHAIN_ID),
            Duration::from_secs(4)
        );
        // Mainnet is not local
        assert_eq!(config.polling_interval_for(1), Duration::from_secs(30));
    }

    #[test]
    fn test_builder_overrides() {
        let config = EventHistoryConfigBuilder::new()
            .max_window(500)
            .window_pacing(Duration::from_millis(100))
            .polling_interval(Duration::from_secs(12))
            .local_chain_id(1337)
            .build();

        assert_eq!(config.max_window.as_u64(), 500);
        assert_eq!(config.window_pacing, Duration::from_millis(100));
        assert_eq!(
            config.polling_interval_for(1337),
            Duration::from_secs(4),
            "added local chain should use the local interval"
        );
        assert_eq!(config.polling_interval_for(1), Duration::from_secs(12));
    }
}
