// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Caller-facing query configuration and the internal fetch cursor.
//!
//! An [`EventQuery`] is an immutable value compared structurally: the
//! lifecycle controller decides between "refetch" and "reset" by
//! comparing fields, never by object identity. A [`FetchCursor`] records
//! how far a query has already scanned so watch polling only fetches the
//! missing tail.

use std::collections::BTreeMap;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Configuration for one event history query.
///
/// Filter values are pre-encoded 32-byte topic words for the named
/// indexed parameters (an `address` left-pads to 32 bytes, a `uint256`
/// is its big-endian representation, dynamic types are their keccak
/// hash). They are applied server-side in the log filter.
///
/// # Examples
///
/// ```
/// use event_history::EventQuery;
///
/// let query = EventQuery::new("YourContract", "GreetingChange")
///     .from_block(31231)
///     .watch(true);
///
/// assert_eq!(query.starting_block(), 31231);
/// assert!(query.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Logical contract name, resolved through the registry.
    pub contract_name: String,
    /// Name of the ABI event to fetch.
    pub event_name: String,
    /// Block to start scanning from. `None` means block 0.
    #[serde(default)]
    pub from_block: Option<u64>,
    /// Indexed-parameter name to required topic word, applied server-side.
    #[serde(default)]
    pub filters: BTreeMap<String, B256>,
    /// Join each log with its containing block.
    #[serde(default)]
    pub include_block: bool,
    /// Join each log with its transaction.
    #[serde(default)]
    pub include_transaction: bool,
    /// Join each log with its execution receipt.
    #[serde(default)]
    pub include_receipt: bool,
    /// Re-run the query on a polling interval.
    #[serde(default)]
    pub watch: bool,
    /// Set to `false` to disable fetching entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl EventQuery {
    /// Create a query for `event_name` on `contract_name`, starting from
    /// block 0, with no filters, no enrichment, watch off, enabled.
    pub fn new(contract_name: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            contract_name: contract_name.into(),
            event_name: event_name.into(),
            from_block: None,
            filters: BTreeMap::new(),
            include_block: false,
            include_transaction: false,
            include_receipt: false,
            watch: false,
            enabled: true,
        }
    }

    /// Set the starting block.
    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = Some(block);
        self
    }

    /// Require an indexed parameter to equal a pre-encoded topic word.
    pub fn filter(mut self, param: impl Into<String>, topic: B256) -> Self {
        self.filters.insert(param.into(), topic);
        self
    }

    /// Enable block enrichment.
    pub fn include_block(mut self, include: bool) -> Self {
        self.include_block = include;
        self
    }

    /// Enable transaction enrichment.
    pub fn include_transaction(mut self, include: bool) -> Self {
        self.include_transaction = include;
        self
    }

    /// Enable receipt enrichment.
    pub fn include_receipt(mut self, include: bool) -> Self {
        self.include_receipt = include;
        self
    }

    /// Enable or disable watch polling.
    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Enable or disable fetching.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The effective starting block (`from_block`, defaulting to 0).
    pub fn starting_block(&self) -> u64 {
        self.from_block.unwrap_or(0)
    }

    /// Whether `other` addresses the same stream of events: same
    /// contract, event, filters, and enrichment flags. `from_block`,
    /// `watch`, and `enabled` steer the lifecycle, not the identity.
    pub fn identity_matches(&self, other: &Self) -> bool {
        self.contract_name == other.contract_name
            && self.event_name == other.event_name
            && self.filters == other.filters
            && self.include_block == other.include_block
            && self.include_transaction == other.include_transaction
            && self.include_receipt == other.include_receipt
    }
}

/// Tracks how far a query has already scanned.
///
/// Advances to `last scanned head + 1` after each successful cycle and
/// only ever moves forward, except for an explicit [`reset`](Self::reset)
/// when the query's starting block or the target network changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchCursor {
    next_from_block: u64,
}

impl FetchCursor {
    /// Create a cursor positioned at `start`.
    pub fn new(start: u64) -> Self {
        Self {
            next_from_block: start,
        }
    }

    /// Block the next fetch should start from.
    pub fn next_from_block(&self) -> u64 {
        self.next_from_block
    }

    /// Advance after a successful cycle. Moving backwards is a logic
    /// error; the cursor stays put rather than rewinding.
    pub fn advance_to(&mut self, next_from_block: u64) {
        debug_assert!(
            next_from_block >= self.next_from_block,
            "cursor must only move forward"
        );
        self.next_from_block = self.next_from_block.max(next_from_block);
    }

    /// Rewind to a new starting block. Only the lifecycle controller
    /// calls this, on a `from_block` or network change.
    pub fn reset(&mut self, start: u64) {
        self.next_from_block = start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_block_defaults_to_zero() {
        let query = EventQuery::new("Token", "Transfer");
        assert_eq!(query.starting_block(), 0);
        assert_eq!(query.from_block(500).starting_block(), 500);
    }

    #[test]
    fn test_structural_equality() {
        let a = EventQuery::new("Token", "Transfer").from_block(10);
        let b = EventQuery::new("Token", "Transfer").from_block(10);
        let c = EventQuery::new("Token", "Approval").from_block(10);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_identity_ignores_lifecycle_fields() {
        let base = EventQuery::new("Token", "Transfer");

        assert!(base.identity_matches(&base.clone().from_block(99)));
        assert!(base.identity_matches(&base.clone().watch(true)));
        assert!(base.identity_matches(&base.clone().enabled(false)));

        assert!(!base.identity_matches(&EventQuery::new("Token", "Approval")));
        assert!(!base.identity_matches(&base.clone().include_block(true)));
        assert!(!base.identity_matches(&base.clone().filter("from", B256::ZERO)));
    }

    #[test]
    fn test_cursor_moves_forward_only() {
        let mut cursor = FetchCursor::new(1000);
        cursor.advance_to(1501);
        assert_eq!(cursor.next_from_block(), 1501);

        // A stale advance must not rewind the cursor.
        cursor.advance_to(1501);
        assert_eq!(cursor.next_from_block(), 1501);
    }

    #[test]
    fn test_cursor_reset() {
        let mut cursor = FetchCursor::new(1000);
        cursor.advance_to(250_001);
        cursor.reset(1000);
        assert_eq!(cursor.next_from_block(), 1000);
    }

    #[test]
    fn test_query_roundtrips_through_serde() {
        let query = EventQuery::new("Token", "Transfer")
            .from_block(1000)
            .filter("from", B256::repeat_byte(0xaa))
            .include_receipt(true)
            .watch(true);

        let json = serde_json::to_string(&query).unwrap();
        let back: EventQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(query, back);
    }

    #[test]
    fn test_enabled_defaults_to_true_when_omitted() {
        let query: EventQuery = serde_json::from_str(
            r#"{"contract_name":"Token","event_name":"Transfer"}"#,
        )
        .unwrap();
        assert!(query.enabled);
        assert!(!query.watch);
        assert_eq!(query.from_block, None);
    }
}
