// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The fetcher's output unit: a decoded log plus optional enrichment.

use alloy_dyn_abi::{DynSolValue, EventExt};
use alloy_json_abi::Event;
use alloy_rpc_types::{Block, Log, Transaction, TransactionReceipt};

use crate::errors::EventHistoryError;

/// One matched event occurrence.
///
/// `block`, `transaction`, and `receipt` are populated only when the
/// query enabled the corresponding enrichment; they stay `None` otherwise
/// (and for logs still pending inclusion, which carry no hashes yet).
#[derive(Debug, Clone)]
pub struct EventRecord {
    /// The raw log entry as returned by the provider.
    pub log: Log,
    /// Decoded event arguments.
    pub args: DecodedArgs,
    /// Containing block, when block enrichment is enabled.
    pub block: Option<Block>,
    /// Emitting transaction, when transaction enrichment is enabled.
    pub transaction: Option<Transaction>,
    /// Execution receipt, when receipt enrichment is enabled.
    pub receipt: Option<TransactionReceipt>,
}

impl EventRecord {
    /// Block number the log was emitted in, if the log is included yet.
    pub fn block_number(&self) -> Option<u64> {
        self.log.block_number
    }
}

/// Decoded event arguments in ABI declaration order.
///
/// Callers address arguments either by parameter name or by position, so
/// both access patterns are supported over the same storage.
///
/// # Examples
///
/// ```rust,ignore
/// let value = record.args.get("value").unwrap();
/// assert_eq!(record.args.position(2), Some(value));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArgs {
    entries: Vec<(String, DynSolValue)>,
}

impl DecodedArgs {
    /// Decode a log's topics and data against an ABI event.
    ///
    /// Indexed and non-indexed values are decoded separately by the ABI
    /// machinery and re-interleaved here into declaration order.
    pub fn decode(event: &Event, log: &Log) -> Result<Self, EventHistoryError> {
        let decoded = event
            .decode_log_parts(log.inner.data.topics().iter().copied(), &log.inner.data.data)
            .map_err(|e| EventHistoryError::decode_failed(e.to_string()))?;

        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();
        let mut entries = Vec::with_capacity(event.inputs.len());

        for input in &event.inputs {
            let value = if input.indexed {
                indexed.next()
            } else {
                body.next()
            }
            .ok_or_else(|| {
                EventHistoryError::decode_failed(format!(
                    "decoded arity does not match ABI inputs for event {}",
                    event.name
                ))
            })?;
            entries.push((input.name.clone(), value));
        }

        Ok(Self { entries })
    }

    /// Argument by parameter name.
    pub fn get(&self, name: &str) -> Option<&DynSolValue> {
        self.entries
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Argument by position in the event declaration.
    pub fn position(&self, index: usize) -> Option<&DynSolValue> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynSolValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of decoded arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the event has no arguments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
