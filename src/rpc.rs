// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! RPC capability boundary.
//!
//! The fetcher talks to the chain through the [`EventRpc`] trait rather
//! than a concrete provider, so tests can script latency, failures, and
//! rate-limit responses. [`AlloyEventRpc`] adapts any Alloy provider to
//! the trait for production use.
//!
//! Failures cross this boundary as [`RpcFailure`], a message-carrying
//! error: most transports surface rate limiting only in the message text,
//! and the retry layer classifies on that text (see
//! [`classify_by_message`](crate::classify_by_message)).

use alloy_primitives::B256;
use alloy_provider::Provider;
use alloy_rpc_types::{Block, Filter, Log, Transaction, TransactionReceipt};
use alloy_transport::TransportError;
use async_trait::async_trait;

/// A failed RPC request, reduced to its message.
///
/// Carries the provider's error text so the retry layer can classify it
/// (rate limit vs. other transient failure). Cloneable so the last
/// failure can be kept while retrying.
#[derive(Debug, Clone, thiserror::Error)]
#[error("rpc request failed: {message}")]
pub struct RpcFailure {
    /// The provider's error message.
    pub message: String,
}

impl RpcFailure {
    /// Create a failure from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Create a failure from an Alloy transport error.
    pub fn from_transport(error: TransportError) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

/// The RPC operations the event history fetcher depends on.
///
/// Implementations are expected to have unpredictable latency, enforce a
/// maximum log-range per call, and occasionally rate-limit requests; the
/// fetcher works around all three.
#[async_trait]
pub trait EventRpc: Send + Sync {
    /// Current chain head block number.
    async fn block_number(&self) -> Result<u64, RpcFailure>;

    /// Logs matching a filter. The filter's block range never exceeds the
    /// configured [`MaxWindow`](crate::MaxWindow).
    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, RpcFailure>;

    /// Block by hash, `None` if the provider does not know it.
    async fn block_by_hash(&self, hash: B256) -> Result<Option<Block>, RpcFailure>;

    /// Transaction by hash, `None` if the provider does not know it.
    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, RpcFailure>;

    /// Receipt by transaction hash, `None` if not yet indexed.
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcFailure>;
}

#[async_trait]
impl<T: EventRpc + ?Sized> EventRpc for std::sync::Arc<T> {
    async fn block_number(&self) -> Result<u64, RpcFailure> {
        (**self).block_number().await
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, RpcFailure> {
        (**self).logs(filter).await
    }

    async fn block_by_hash(&self, hash: B256) -> Result<Option<Block>, RpcFailure> {
        (**self).block_by_hash(hash).await
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, RpcFailure> {
        (**self).transaction_by_hash(hash).await
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcFailure> {
        (**self).transaction_receipt(hash).await
    }
}

/// [`EventRpc`] implementation over any Alloy provider.
///
/// # Examples
///
/// ```rust,ignore
/// use alloy_provider::ProviderBuilder;
/// use event_history::AlloyEventRpc;
///
/// let provider = ProviderBuilder::new().connect_http(rpc_url.parse()?);
/// let rpc = AlloyEventRpc::new(provider);
/// ```
#[derive(Debug, Clone)]
pub struct AlloyEventRpc<P> {
    inner: P,
}

impl<P> AlloyEventRpc<P> {
    /// Wrap a provider.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.inner
    }

    /// Consume the adapter and return the underlying provider.
    pub fn into_provider(self) -> P {
        self.inner
    }
}

#[async_trait]
impl<P> EventRpc for AlloyEventRpc<P>
where
    P: Provider,
{
    async fn block_number(&self) -> Result<u64, RpcFailure> {
        self.inner
            .get_block_number()
            .await
            .map_err(RpcFailure::from_transport)
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, RpcFailure> {
        self.inner
            .get_logs(filter)
            .await
            .map_err(RpcFailure::from_transport)
    }

    async fn block_by_hash(&self, hash: B256) -> Result<Option<Block>, RpcFailure> {
        self.inner
            .get_block_by_hash(hash)
            .await
            .map_err(RpcFailure::from_transport)
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, RpcFailure> {
        self.inner
            .get_transaction_by_hash(hash)
            .await
            .map_err(RpcFailure::from_transport)
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcFailure> {
        self.inner
            .get_transaction_receipt(hash)
            .await
            .map_err(RpcFailure::from_transport)
    }
}
