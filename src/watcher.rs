// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Polling lifecycle around the fetcher.
//!
//! [`EventHistory`] owns a query, its cursor, and the accumulated
//! records, and drives repeated fetch cycles: immediately on query
//! changes, on a polling interval in watch mode, and from scratch after
//! a starting-block or network change.
//!
//! All mutation goes through `&mut self`, so at most one fetch cycle per
//! query can be in flight: overlapping timer ticks cannot stack
//! concurrent cycles or corrupt the cursor. The fetch loop's suspension
//! points (window fetches, backoff, pacing) all live inside a single
//! `poll_once` call.

use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::{
    errors::EventHistoryError,
    fetcher::{EventHistoryFetcher, FetchOutcome},
    query::{EventQuery, FetchCursor},
    record::EventRecord,
    rpc::EventRpc,
};

/// Accumulated event history for one query, kept fresh by polling.
///
/// The caller-visible state is the tri-state familiar from data-fetching
/// layers: [`records`](Self::records) (newest first),
/// [`is_loading`](Self::is_loading), and [`error`](Self::error). On a
/// fatal cycle error the records clear and the error is set; the next
/// successful cycle clears it again.
///
/// # Examples
///
/// ```rust,ignore
/// use event_history::{EventHistory, EventQuery};
///
/// let mut history = EventHistory::new(fetcher, query, chain_id);
/// history.poll_once().await;
///
/// for record in history.records() {
///     println!("{:?}", record.args);
/// }
/// ```
pub struct EventHistory<R> {
    fetcher: EventHistoryFetcher<R>,
    query: EventQuery,
    chain_id: u64,
    cursor: FetchCursor,
    records: Vec<EventRecord>,
    error: Option<EventHistoryError>,
    is_loading: bool,
}

impl<R: EventRpc> EventHistory<R> {
    /// Create a history for `query` against the network identified by
    /// `chain_id`. No fetch happens until [`poll_once`](Self::poll_once)
    /// or [`run`](Self::run) is called.
    pub fn new(fetcher: EventHistoryFetcher<R>, query: EventQuery, chain_id: u64) -> Self {
        let cursor = FetchCursor::new(query.starting_block());
        Self {
            fetcher,
            query,
            chain_id,
            cursor,
            records: Vec::new(),
            error: None,
            is_loading: false,
        }
    }

    /// Accumulated records, newest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Error from the last cycle, if it failed.
    pub fn error(&self) -> Option<&EventHistoryError> {
        self.error.as_ref()
    }

    /// True while a fetch cycle is executing.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The active query.
    pub fn query(&self) -> &EventQuery {
        &self.query
    }

    /// The chain id fetches currently target.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Block the next cycle will start scanning from.
    pub fn next_from_block(&self) -> u64 {
        self.cursor.next_from_block()
    }

    /// Run one fetch cycle and fold its outcome into the accumulated
    /// state.
    ///
    /// - Skipped cycles leave records, error, and cursor untouched.
    /// - Successful cycles splice the new batch at the head of the list
    ///   (newest first) and clear any previous error.
    /// - Failed cycles clear the records and store the error.
    pub async fn poll_once(&mut self) {
        self.is_loading = true;
        let outcome = self.fetcher.fetch(&self.query, &mut self.cursor).await;
        self.is_loading = false;

        match outcome {
            Ok(FetchOutcome::Skipped) => {}
            Ok(FetchOutcome::Fetched(batch)) => {
                self.merge(batch);
                self.error = None;
            }
            Err(error) => {
                self.records.clear();
                self.error = Some(error);
            }
        }
    }

    /// Splice a batch (ascending chain order) at the head of the
    /// accumulated list, keeping the whole list newest-first.
    fn merge(&mut self, mut batch: Vec<EventRecord>) {
        batch.reverse();
        batch.append(&mut self.records);
        self.records = batch;
    }

    /// Apply a new query and fetch immediately.
    ///
    /// A changed starting block rewinds everything (cursor, records,
    /// error) before fetching, the same as a network change. Any other
    /// change — identity fields, watch, enabled — keeps the accumulated
    /// state and just triggers a cycle. An identical query is a no-op.
    pub async fn set_query(&mut self, query: EventQuery) {
        if query == self.query {
            return;
        }

        let rewind = query.from_block != self.query.from_block;
        if !query.identity_matches(&self.query) {
            debug!(
                contract = %query.contract_name,
                event = %query.event_name,
                "query identity changed"
            );
        }
        self.query = query;

        if rewind {
            self.reset();
        }
        self.poll_once().await;
    }

    /// Switch to a different network: rewind to the query's starting
    /// block, clear accumulated state, and fetch fresh.
    pub async fn set_chain(&mut self, chain_id: u64) {
        if chain_id == self.chain_id {
            return;
        }
        info!(
            old_chain_id = self.chain_id,
            new_chain_id = chain_id,
            "target network changed, resetting event history"
        );
        self.chain_id = chain_id;
        self.reset();
        self.poll_once().await;
    }

    /// The interval between watch polls, or `None` when watch is off.
    /// Local development chains poll faster than production networks.
    pub fn poll_interval(&self) -> Option<Duration> {
        self.query
            .watch
            .then(|| self.fetcher.config().polling_interval_for(self.chain_id))
    }

    /// Fetch once, then keep polling on the watch interval until `stop`
    /// fires. Returns immediately after the first cycle when watch is
    /// off.
    pub async fn run(&mut self, mut stop: oneshot::Receiver<()>) {
        self.poll_once().await;

        loop {
            let Some(interval) = self.poll_interval() else {
                return;
            };

            tokio::select! {
                _ = &mut stop => {
                    debug!("event history watch stopped");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }

            self.poll_once().await;
        }
    }

    fn reset(&mut self) {
        self.cursor.reset(self.query.starting_block());
        self.records.clear();
        self.error = None;
    }
}
