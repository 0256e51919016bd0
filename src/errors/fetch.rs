// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors surfaced by a fetch cycle.

use super::RpcError;
use crate::rpc::RpcFailure;

/// Everything a fetch cycle can report to the caller.
///
/// Configuration errors (`UnknownEvent`, `UnknownFilterParam`) are fatal
/// for the query until its configuration changes. The rest are
/// per-cycle: the next poll starts over from the cursor.
///
/// # Examples
///
/// ```rust,ignore
/// match fetcher.fetch(&query, &mut cursor).await {
///     Ok(outcome) => handle(outcome),
///     Err(EventHistoryError::RetriesExhausted { attempts, .. }) => {
///         eprintln!("gave up after {attempts} attempts");
///     }
///     Err(e) => eprintln!("fetch failed: {e}"),
/// }
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventHistoryError {
    /// The requested event name does not exist in the resolved ABI.
    #[error("event {event:?} not found in ABI of contract {contract:?}")]
    UnknownEvent {
        /// The requested event name.
        event: String,
        /// The logical contract name the ABI was resolved for.
        contract: String,
    },

    /// A filter names a parameter that is not an indexed input of the
    /// event, so it can never match server-side.
    #[error("filter parameter {param:?} is not an indexed input of event {event:?}")]
    UnknownFilterParam {
        /// The offending filter parameter name.
        param: String,
        /// The event the filter was applied to.
        event: String,
    },

    /// A window fetch consumed its whole retry budget.
    ///
    /// Aborts the cycle; logs collected from earlier windows are
    /// discarded so a cycle is all-or-nothing.
    #[error("gave up fetching logs for blocks {from_block}-{to_block} after {attempts} attempts")]
    RetriesExhausted {
        /// Attempts made, initial request included.
        attempts: u32,
        /// First block of the failing window.
        from_block: u64,
        /// Last block of the failing window.
        to_block: u64,
        /// The last failure observed.
        #[source]
        source: RpcFailure,
    },

    /// An RPC lookup outside the retried window fetches failed.
    ///
    /// Head resolution and enrichment lookups are not independently
    /// retried; their failures end the cycle.
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    /// A log could not be decoded against the ABI event.
    #[error("failed to decode event: {details}")]
    DecodeFailed {
        /// Why the decode failed.
        details: String,
    },
}

impl EventHistoryError {
    /// Create an `UnknownEvent` error.
    pub fn unknown_event(event: impl Into<String>, contract: impl Into<String>) -> Self {
        EventHistoryError::UnknownEvent {
            event: event.into(),
            contract: contract.into(),
        }
    }

    /// Create an `UnknownFilterParam` error.
    pub fn unknown_filter_param(param: impl Into<String>, event: impl Into<String>) -> Self {
        EventHistoryError::UnknownFilterParam {
            param: param.into(),
            event: event.into(),
        }
    }

    /// Create a `DecodeFailed` error with details.
    pub fn decode_failed(details: impl Into<String>) -> Self {
        EventHistoryError::DecodeFailed {
            details: details.into(),
        }
    }
}
