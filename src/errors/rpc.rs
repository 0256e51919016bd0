// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! RPC lookup errors with operation context.

use alloy_primitives::B256;

use crate::rpc::RpcFailure;

/// Errors from individual RPC operations during a fetch cycle.
///
/// Distinguishes calls that failed outright from calls that succeeded
/// but found nothing — a block lookup can fail because the provider is
/// down, or "succeed" with no block because of a reorg or lagging index.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    /// Failed to fetch the current chain head.
    #[error("failed to get current block number")]
    GetBlockNumberFailed {
        /// The underlying provider failure.
        #[source]
        source: RpcFailure,
    },

    /// The block lookup call itself failed.
    #[error("failed to fetch block {block_hash}")]
    BlockLookupFailed {
        /// Hash of the block we tried to fetch.
        block_hash: B256,
        /// The underlying provider failure.
        #[source]
        source: RpcFailure,
    },

    /// The transaction lookup call itself failed.
    #[error("failed to fetch transaction {tx_hash}")]
    TransactionLookupFailed {
        /// Hash of the transaction we tried to fetch.
        tx_hash: B256,
        /// The underlying provider failure.
        #[source]
        source: RpcFailure,
    },

    /// The receipt lookup call itself failed.
    #[error("failed to fetch receipt for transaction {tx_hash}")]
    ReceiptLookupFailed {
        /// Hash of the transaction whose receipt we tried to fetch.
        tx_hash: B256,
        /// The underlying provider failure.
        #[source]
        source: RpcFailure,
    },

    /// The provider does not know a block a log claims to be part of.
    #[error("block not found: {block_hash}")]
    BlockNotFound {
        /// The missing block's hash.
        block_hash: B256,
    },

    /// The provider does not know a transaction a log was emitted by.
    #[error("transaction not found: {tx_hash}")]
    TransactionNotFound {
        /// The missing transaction's hash.
        tx_hash: B256,
    },

    /// No receipt exists for a transaction yet.
    #[error("receipt not found for transaction: {tx_hash}")]
    ReceiptNotFound {
        /// The transaction whose receipt is missing.
        tx_hash: B256,
    },
}

impl RpcError {
    /// Helper to wrap a head-lookup failure.
    pub fn get_block_number_failed(source: RpcFailure) -> Self {
        RpcError::GetBlockNumberFailed { source }
    }

    /// Helper to wrap a block-lookup failure.
    pub fn block_lookup_failed(block_hash: B256, source: RpcFailure) -> Self {
        RpcError::BlockLookupFailed { block_hash, source }
    }

    /// Helper to wrap a transaction-lookup failure.
    pub fn transaction_lookup_failed(tx_hash: B256, source: RpcFailure) -> Self {
        RpcError::TransactionLookupFailed { tx_hash, source }
    }

    /// Helper to wrap a receipt-lookup failure.
    pub fn receipt_lookup_failed(tx_hash: B256, source: RpcFailure) -> Self {
        RpcError::ReceiptLookupFailed { tx_hash, source }
    }
}
