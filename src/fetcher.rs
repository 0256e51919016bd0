// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The event history fetcher: one fetch cycle from cursor to chain head.
//!
//! A cycle resolves the contract, tiles the missing block range into
//! provider-sized windows, fetches each window's logs with
//! classification-aware retry, paces requests between windows, and
//! assembles decoded, optionally enriched records. A cycle is
//! all-or-nothing: any window exhausting its retry budget (or any
//! enrichment failure) discards the cycle's partial results and surfaces
//! the error. A window failure leaves the cursor where the cycle
//! started, so the next poll retries the same range.

use std::sync::Arc;

use alloy_json_abi::Event;
use alloy_rpc_types::{Block, Filter, Log, Transaction, TransactionReceipt};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    config::EventHistoryConfig,
    errors::{EventHistoryError, RpcError},
    query::{EventQuery, FetchCursor},
    record::{DecodedArgs, EventRecord},
    registry::{ContractRegistry, RegistryLookup},
    retry::{classify_by_message, ErrorClassifier},
    rpc::EventRpc,
    window::LogWindow,
};

/// Outcome of one fetch cycle.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Nothing was fetched: the query is disabled, the contract is not
    /// resolved yet, or the cursor is already past the chain head. Not
    /// an error; the caller's state is left untouched.
    Skipped,
    /// The cycle completed; records are in ascending chain order.
    Fetched(Vec<EventRecord>),
}

impl FetchOutcome {
    /// Records from a completed cycle, or `None` when skipped.
    pub fn records(self) -> Option<Vec<EventRecord>> {
        match self {
            FetchOutcome::Skipped => None,
            FetchOutcome::Fetched(records) => Some(records),
        }
    }
}

/// Fetches historical event logs in provider-sized windows.
///
/// The fetcher is stateless apart from its collaborators; scan progress
/// lives in the [`FetchCursor`] the caller passes in, which is what lets
/// the watch lifecycle reset or resume a scan without rebuilding the
/// fetcher.
///
/// # Examples
///
/// ```rust,ignore
/// use event_history::{
///     AlloyEventRpc, EventHistoryConfig, EventHistoryFetcher, EventQuery, FetchCursor,
/// };
///
/// let fetcher = EventHistoryFetcher::new(
///     AlloyEventRpc::new(provider),
///     registry,
///     EventHistoryConfig::default(),
/// );
///
/// let query = EventQuery::new("YourContract", "GreetingChange").from_block(31231);
/// let mut cursor = FetchCursor::new(query.starting_block());
///
/// let outcome = fetcher.fetch(&query, &mut cursor).await?;
/// ```
pub struct EventHistoryFetcher<R> {
    rpc: R,
    registry: Arc<dyn ContractRegistry>,
    config: EventHistoryConfig,
    classifier: ErrorClassifier,
}

impl<R: EventRpc> EventHistoryFetcher<R> {
    /// Create a fetcher with the default message-substring error
    /// classifier.
    pub fn new(rpc: R, registry: Arc<dyn ContractRegistry>, config: EventHistoryConfig) -> Self {
        Self {
            rpc,
            registry,
            config,
            classifier: Arc::new(classify_by_message),
        }
    }

    /// Replace the rate-limit classifier, e.g. with one that inspects
    /// structured error codes on transports that provide them.
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// The fetcher's configuration.
    pub fn config(&self) -> &EventHistoryConfig {
        &self.config
    }

    /// Run one fetch cycle for `query`, scanning from the cursor (or the
    /// query's starting block, whichever is further along) to the
    /// current chain head.
    ///
    /// On success the cursor advances to `head + 1` and the returned
    /// records cover every matching log in the scanned range, in
    /// ascending chain order, with no duplicates and no gaps.
    ///
    /// # Errors
    ///
    /// - [`EventHistoryError::UnknownEvent`] / [`UnknownFilterParam`] for
    ///   configuration mistakes.
    /// - [`EventHistoryError::RetriesExhausted`] when a window fails all
    ///   its attempts.
    /// - [`EventHistoryError::Rpc`] / [`DecodeFailed`] for head lookups,
    ///   enrichment, and decoding.
    ///
    /// [`UnknownFilterParam`]: EventHistoryError::UnknownFilterParam
    /// [`DecodeFailed`]: EventHistoryError::DecodeFailed
    pub async fn fetch(
        &self,
        query: &EventQuery,
        cursor: &mut FetchCursor,
    ) -> Result<FetchOutcome, EventHistoryError> {
        let metadata = match self.registry.resolve(&query.contract_name) {
            RegistryLookup::Ready(metadata) => metadata,
            RegistryLookup::Loading => {
                // Metadata still on its way; skip quietly instead of
                // surfacing a burst of spurious errors.
                debug!(
                    contract = %query.contract_name,
                    "contract metadata not resolved yet, skipping fetch"
                );
                return Ok(FetchOutcome::Skipped);
            }
            RegistryLookup::Missing => {
                debug!(
                    contract = %query.contract_name,
                    "contract not found in registry, skipping fetch"
                );
                return Ok(FetchOutcome::Skipped);
            }
        };

        if !query.enabled {
            debug!(
                contract = %query.contract_name,
                event = %query.event_name,
                "query disabled, skipping fetch"
            );
            return Ok(FetchOutcome::Skipped);
        }

        let event = metadata
            .abi
            .events
            .get(&query.event_name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| {
                EventHistoryError::unknown_event(&query.event_name, &query.contract_name)
            })?;

        let filter_template = build_filter(event, query, metadata.address)?;

        let head = self
            .rpc
            .block_number()
            .await
            .map_err(RpcError::get_block_number_failed)?;

        let start = cursor.next_from_block().max(query.starting_block());
        if start > head {
            debug!(
                start = start,
                head = head,
                "cursor already past chain head, nothing to fetch"
            );
            return Ok(FetchOutcome::Skipped);
        }

        info!(
            contract = %query.contract_name,
            event = %query.event_name,
            start = start,
            head = head,
            windows = self.config.max_window.windows_needed(start, head),
            "starting event history fetch"
        );

        let mut all_logs = Vec::new();
        for (i, window) in self.config.max_window.windows(start, head).enumerate() {
            if i > 0 {
                // Fixed pacing between windows, independent of retry
                // activity, to stay under request-rate ceilings.
                sleep(self.config.window_pacing).await;
            }

            let logs = self.fetch_window(&filter_template, window).await?;
            debug!(
                window = %window,
                logs_count = logs.len(),
                "fetched logs for window"
            );
            all_logs.extend(logs);
        }

        cursor.advance_to(head + 1);

        let mut records = Vec::with_capacity(all_logs.len());
        for log in all_logs {
            let args = DecodedArgs::decode(event, &log)?;
            let (block, transaction, receipt) = self.enrich(query, &log).await?;
            records.push(EventRecord {
                log,
                args,
                block,
                transaction,
                receipt,
            });
        }

        info!(
            contract = %query.contract_name,
            event = %query.event_name,
            total_records = records.len(),
            next_from_block = cursor.next_from_block(),
            "finished event history fetch"
        );

        Ok(FetchOutcome::Fetched(records))
    }

    /// Fetch one window's logs, retrying with backoff until the attempt
    /// budget runs out.
    async fn fetch_window(
        &self,
        filter_template: &Filter,
        window: LogWindow,
    ) -> Result<Vec<Log>, EventHistoryError> {
        let filter = filter_template
            .clone()
            .from_block(window.start)
            .to_block(window.end);

        let policy = &self.config.retry;
        let mut failures = 0u32;

        loop {
            match self.rpc.logs(&filter).await {
                Ok(logs) => {
                    if failures > 0 {
                        debug!(window = %window, attempts = failures + 1, "window fetch succeeded after retry");
                    }
                    return Ok(logs);
                }
                Err(failure) => {
                    failures += 1;
                    if policy.is_exhausted(failures) {
                        warn!(
                            window = %window,
                            attempts = failures,
                            error = %failure,
                            "retry budget exhausted for window"
                        );
                        return Err(EventHistoryError::RetriesExhausted {
                            attempts: failures,
                            from_block: window.start,
                            to_block: window.end,
                            source: failure,
                        });
                    }

                    let kind = (self.classifier)(&failure);
                    let delay = policy.backoff(kind, failures);
                    warn!(
                        window = %window,
                        attempt = failures,
                        kind = ?kind,
                        delay_ms = delay.as_millis(),
                        error = %failure,
                        "window fetch failed, backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Resolve the enrichment data a query asked for, sequentially and
    /// without independent retry. A pending log missing the relevant
    /// hash yields `None`; a hash the provider cannot resolve is an
    /// error.
    async fn enrich(
        &self,
        query: &EventQuery,
        log: &Log,
    ) -> Result<
        (
            Option<Block>,
            Option<Transaction>,
            Option<TransactionReceipt>,
        ),
        EventHistoryError,
    > {
        let block = match (query.include_block, log.block_hash) {
            (true, Some(hash)) => Some(
                self.rpc
                    .block_by_hash(hash)
                    .await
                    .map_err(|e| RpcError::block_lookup_failed(hash, e))?
                    .ok_or(RpcError::BlockNotFound { block_hash: hash })?,
            ),
            _ => None,
        };

        let transaction = match (query.include_transaction, log.transaction_hash) {
            (true, Some(hash)) => Some(
                self.rpc
                    .transaction_by_hash(hash)
                    .await
                    .map_err(|e| RpcError::transaction_lookup_failed(hash, e))?
                    .ok_or(RpcError::TransactionNotFound { tx_hash: hash })?,
            ),
            _ => None,
        };

        let receipt = match (query.include_receipt, log.transaction_hash) {
            (true, Some(hash)) => Some(
                self.rpc
                    .transaction_receipt(hash)
                    .await
                    .map_err(|e| RpcError::receipt_lookup_failed(hash, e))?
                    .ok_or(RpcError::ReceiptNotFound { tx_hash: hash })?,
            ),
            _ => None,
        };

        Ok((block, transaction, receipt))
    }
}

/// Build the log filter for a query: contract address, event signature,
/// and topic constraints for any indexed-parameter filters.
fn build_filter(
    event: &Event,
    query: &EventQuery,
    address: alloy_primitives::Address,
) -> Result<Filter, EventHistoryError> {
    let mut filter = Filter::new().address(address).event_signature(event.selector());

    for (param, topic) in &query.filters {
        let slot = indexed_position(event, param).ok_or_else(|| {
            EventHistoryError::unknown_filter_param(param, &event.name)
        })?;
        filter = match slot {
            0 => filter.topic1(*topic),
            1 => filter.topic2(*topic),
            2 => filter.topic3(*topic),
            // Solidity allows at most three indexed parameters, so the
            // position can only be 0..=2 for a well-formed ABI.
            _ => {
                return Err(EventHistoryError::unknown_filter_param(param, &event.name));
            }
        };
    }

    Ok(filter)
}

/// Position of `param` among the event's indexed inputs, if it is one.
fn indexed_position(event: &Event, param: &str) -> Option<usize> {
    event
        .inputs
        .iter()
        .filter(|input| input.indexed)
        .position(|input| input.name == param)
}
