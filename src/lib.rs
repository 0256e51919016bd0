// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Resilient retrieval of historical EVM contract events.
//!
//! RPC providers make fetching a contract's full event history harder
//! than a single `eth_getLogs` call: they cap the block range per query,
//! rate-limit bursts of requests, and fail transiently. This crate wraps
//! those concerns into one pipeline:
//!
//! - **Windowing** — the requested range is tiled into provider-sized
//!   windows, scanned strictly in increasing order so a failure leaves a
//!   well-defined resume point ([`MaxWindow`], [`LogWindow`]).
//! - **Retry with classification** — failed window fetches are retried
//!   with exponential backoff; rate-limit responses get a longer,
//!   jittered schedule than ordinary hiccups ([`RetryPolicy`],
//!   [`classify_by_message`]).
//! - **Pacing** — a fixed delay between windows keeps the scan under
//!   request-rate ceilings even when every call succeeds.
//! - **Incremental polling** — a [`FetchCursor`] remembers how far a
//!   query has scanned; watch mode re-polls just the missing tail
//!   ([`EventHistory`]).
//! - **Enrichment** — each log can be joined with its block,
//!   transaction, and receipt ([`EventRecord`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use alloy_provider::ProviderBuilder;
//! use event_history::{
//!     AlloyEventRpc, ContractMetadata, EventHistory, EventHistoryConfig,
//!     EventHistoryFetcher, EventQuery, StaticContractRegistry,
//! };
//!
//! let provider = ProviderBuilder::new().connect_http(rpc_url.parse()?);
//!
//! let mut registry = StaticContractRegistry::new();
//! registry.insert("YourContract", ContractMetadata { address, abi });
//!
//! let fetcher = EventHistoryFetcher::new(
//!     AlloyEventRpc::new(provider),
//!     Arc::new(registry),
//!     EventHistoryConfig::default(),
//! );
//!
//! let query = EventQuery::new("YourContract", "GreetingChange")
//!     .from_block(31231)
//!     .watch(true);
//!
//! let mut history = EventHistory::new(fetcher, query, chain_id);
//! history.poll_once().await;
//!
//! for record in history.records() {
//!     println!("{:?}", record.args.get("newGreeting"));
//! }
//! ```

mod config;
pub mod errors;
mod fetcher;
mod query;
mod record;
mod registry;
mod retry;
mod rpc;
mod watcher;
mod window;

pub use config::{EventHistoryConfig, EventHistoryConfigBuilder, LOCAL_DEV_CHAIN_ID};
pub use errors::{EventHistoryError, RpcError};
pub use fetcher::{EventHistoryFetcher, FetchOutcome};
pub use query::{EventQuery, FetchCursor};
pub use record::{DecodedArgs, EventRecord};
pub use registry::{ContractMetadata, ContractRegistry, RegistryLookup, StaticContractRegistry};
pub use retry::{classify_by_message, ErrorClassifier, ErrorKind, RetryPolicy};
pub use rpc::{AlloyEventRpc, EventRpc, RpcFailure};
pub use watcher::EventHistory;
pub use window::{LogWindow, MaxWindow, WindowIterator};
