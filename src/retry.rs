// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Retry backoff policy and failure classification.
//!
//! A failed window fetch is retried with exponential backoff. How long to
//! back off depends on why the request failed: providers that are
//! throttling need substantially longer pauses (plus jitter, so that
//! concurrent clients do not re-synchronize their bursts) than a
//! transient network hiccup does.
//!
//! Classification is pluggable. The default, [`classify_by_message`],
//! matches substrings of the provider's error text because JSON-RPC
//! transports rarely expose a typed throttling code. That heuristic is
//! inherently fragile; swap in a structured classifier via
//! [`EventHistoryFetcher::with_classifier`](crate::EventHistoryFetcher::with_classifier)
//! when your transport supports one.

use std::{sync::Arc, time::Duration};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rpc::RpcFailure;

/// Default ceiling on attempts per window (initial request included).
const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Base delay when the provider is rate limiting (1s).
const DEFAULT_RATE_LIMIT_BASE_MS: u64 = 1_000;
/// Cap on any single backoff delay (30s).
const DEFAULT_BACKOFF_CAP_MS: u64 = 30_000;
/// Upper bound on the random jitter added to rate-limit backoff (500ms).
const DEFAULT_JITTER_MS: u64 = 500;
/// Base delay for other transient failures (300ms).
const DEFAULT_TRANSIENT_BASE_MS: u64 = 300;

/// Why an RPC request failed, as far as backoff is concerned.
///
/// Classification determines the backoff shape only; both kinds share
/// the same attempt ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The provider is throttling requests. Back off long, with jitter.
    RateLimited,
    /// Any other transient failure. Back off short.
    Transient,
}

/// Maps an [`RpcFailure`] to an [`ErrorKind`].
///
/// A capability-typed callback so the substring heuristic can be replaced
/// without touching the retry loop.
pub type ErrorClassifier = Arc<dyn Fn(&RpcFailure) -> ErrorKind + Send + Sync>;

/// Default classifier: substring matching on the provider's message.
///
/// Treats "Too Many Requests", "429", and "rate limit" as throttling;
/// everything else as an ordinary transient failure.
///
/// # Examples
///
/// ```
/// use event_history::{classify_by_message, ErrorKind, RpcFailure};
///
/// let throttled = RpcFailure::new("HTTP 429 Too Many Requests");
/// assert_eq!(classify_by_message(&throttled), ErrorKind::RateLimited);
///
/// let flaky = RpcFailure::new("connection reset by peer");
/// assert_eq!(classify_by_message(&flaky), ErrorKind::Transient);
/// ```
pub fn classify_by_message(failure: &RpcFailure) -> ErrorKind {
    let message = &failure.message;
    if message.contains("Too Many Requests")
        || message.contains("429")
        || message.contains("rate limit")
    {
        ErrorKind::RateLimited
    } else {
        ErrorKind::Transient
    }
}

/// Backoff schedule for retried window fetches.
///
/// The delay before retry `n` (counting failures from 1) is:
///
/// ```text
/// rate limited: min(cap, rate_limit_base * 2^(n-1)) + jitter(0..=max_jitter)
/// transient:    min(cap, transient_base  * 2^(n-1))
/// ```
///
/// # Examples
///
/// ```
/// use event_history::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 5);
/// assert_eq!(policy.rate_limit_base, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per window, initial request included.
    pub max_attempts: u32,
    /// Base delay when rate limited.
    pub rate_limit_base: Duration,
    /// Upper bound on the random jitter added to rate-limit delays.
    pub max_jitter: Duration,
    /// Base delay for other transient failures.
    pub transient_base: Duration,
    /// Cap on any single delay, regardless of the exponential calculation.
    pub backoff_cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_base: Duration::from_millis(DEFAULT_RATE_LIMIT_BASE_MS),
            max_jitter: Duration::from_millis(DEFAULT_JITTER_MS),
            transient_base: Duration::from_millis(DEFAULT_TRANSIENT_BASE_MS),
            backoff_cap: Duration::from_millis(DEFAULT_BACKOFF_CAP_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after the `failures`-th consecutive failure
    /// (1-based) of the given kind. Saturating throughout; never exceeds
    /// `backoff_cap` plus jitter.
    pub fn backoff(&self, kind: ErrorKind, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        match kind {
            ErrorKind::RateLimited => {
                let base = exponential(self.rate_limit_base, exponent, self.backoff_cap);
                base + self.jitter()
            }
            ErrorKind::Transient => exponential(self.transient_base, exponent, self.backoff_cap),
        }
    }

    /// True once `failures` has consumed the attempt budget.
    pub fn is_exhausted(&self, failures: u32) -> bool {
        failures >= self.max_attempts
    }

    fn jitter(&self) -> Duration {
        let max_jitter_ms = self.max_jitter.as_millis() as u64;
        if max_jitter_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_jitter_ms))
    }
}

/// `min(cap, base * 2^exponent)` with overflow protection.
fn exponential(base: Duration, exponent: u32, cap: Duration) -> Duration {
    let multiplier = 2u64.saturating_pow(exponent);
    let delay_ms = base.as_millis().saturating_mul(multiplier as u128);
    let capped_ms = delay_ms.min(cap.as_millis()) as u64;
    Duration::from_millis(capped_ms)
}
