// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the event-history library.
//!
//! Two layers:
//!
//! - [`RpcError`] — individual RPC lookups that failed or came back
//!   empty, with the operation context attached.
//! - [`EventHistoryError`] — everything a fetch cycle can surface to the
//!   caller: configuration mistakes, exhausted retry budgets, RPC
//!   failures, and decode failures.
//!
//! The pre-fetch skip conditions (registry still loading, query
//! disabled, cursor already at the head) are deliberately not errors;
//! they are reported as [`FetchOutcome::Skipped`](crate::FetchOutcome).

mod fetch;
mod rpc;

pub use fetch::EventHistoryError;
pub use rpc::RpcError;
