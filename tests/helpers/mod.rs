// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for event-history integration tests.
//!
//! Provides a scriptable [`MockRpc`], registry fixtures, and log/block
//! builders so the fetch pipeline can be tested without a blockchain.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use alloy_consensus::{
    transaction::Recovered, ReceiptEnvelope, ReceiptWithBloom, Signed, TxEnvelope, TxLegacy,
};
use alloy_json_abi::{Event, JsonAbi};
use alloy_primitives::{Address, Bytes, LogData, Signature, B256, U256};
use alloy_rpc_types::{Block, BlockTransactions, Filter, Header, Log, Transaction, TransactionReceipt};
use async_trait::async_trait;
use event_history::{
    ContractMetadata, ContractRegistry, EventRpc, RegistryLookup, RpcFailure,
    StaticContractRegistry,
};

/// Address the test token contract is "deployed" at.
pub const TOKEN_ADDRESS: Address = Address::repeat_byte(0x42);

/// Initialize test logging once; honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// ERC-20 style ABI with a Transfer event.
pub fn transfer_abi() -> JsonAbi {
    serde_json::from_str(
        r#"[{"type":"event","name":"Transfer","inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256","indexed":false}],"anonymous":false}]"#,
    )
    .unwrap()
}

/// The Transfer event definition from [`transfer_abi`].
pub fn transfer_event() -> Event {
    transfer_abi().events["Transfer"][0].clone()
}

/// Registry with the test token registered under `"Token"`.
pub fn token_registry() -> Arc<StaticContractRegistry> {
    let mut registry = StaticContractRegistry::new();
    registry.insert(
        "Token",
        ContractMetadata {
            address: TOKEN_ADDRESS,
            abi: transfer_abi(),
        },
    );
    Arc::new(registry)
}

/// Registry that reports its metadata as still loading, for
/// skip-not-error tests.
pub struct LoadingRegistry;

impl ContractRegistry for LoadingRegistry {
    fn resolve(&self, _contract_name: &str) -> RegistryLookup {
        RegistryLookup::Loading
    }
}

/// Deterministic block hash for a block number.
pub fn block_hash(block_number: u64) -> B256 {
    B256::left_padding_from(&block_number.to_be_bytes())
}

/// Deterministic transaction hash for a chain position, matching the
/// hash [`transfer_log`] stamps on its logs.
pub fn tx_hash(block_number: u64, log_index: u64) -> B256 {
    B256::left_padding_from(&(block_number * 1000 + log_index).to_be_bytes())
}

/// Build a Transfer log at a given chain position.
pub fn transfer_log(block_number: u64, log_index: u64, value: u64) -> Log {
    let event = transfer_event();
    let from = Address::repeat_byte(0xaa);
    let to = Address::repeat_byte(0xbb);
    let topics = vec![event.selector(), from.into_word(), to.into_word()];
    let data = Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec());

    Log {
        inner: alloy_primitives::Log {
            address: TOKEN_ADDRESS,
            data: LogData::new_unchecked(topics, data),
        },
        block_hash: Some(block_hash(block_number)),
        block_number: Some(block_number),
        block_timestamp: None,
        transaction_hash: Some(tx_hash(block_number, log_index)),
        transaction_index: Some(0),
        log_index: Some(log_index),
        removed: false,
    }
}

/// Minimal block fixture carrying the given hash.
pub fn test_block(hash: B256) -> Block {
    Block {
        header: Header {
            hash,
            inner: alloy_consensus::Header::default(),
            total_difficulty: None,
            size: None,
        },
        uncles: Vec::new(),
        transactions: BlockTransactions::Hashes(Vec::new()),
        withdrawals: None,
    }
}

/// Minimal signed-legacy transaction fixture carrying the given hash.
pub fn test_transaction(hash: B256) -> Transaction {
    let signature = Signature::new(U256::from(1), U256::from(1), false);
    let signed = Signed::new_unchecked(TxLegacy::default(), signature, hash);
    Transaction {
        inner: Recovered::new_unchecked(
            TxEnvelope::Legacy(signed),
            Address::repeat_byte(0xaa),
        ),
        block_hash: None,
        block_number: None,
        transaction_index: None,
        effective_gas_price: None,
    }
}

/// Minimal receipt fixture for the given transaction hash.
pub fn test_receipt(transaction_hash: B256) -> TransactionReceipt {
    TransactionReceipt {
        inner: ReceiptEnvelope::Legacy(ReceiptWithBloom::default()),
        transaction_hash,
        transaction_index: Some(0),
        block_hash: None,
        block_number: None,
        gas_used: 21_000,
        effective_gas_price: 0,
        blob_gas_used: None,
        blob_gas_price: None,
        from: Address::repeat_byte(0xaa),
        to: Some(TOKEN_ADDRESS),
        contract_address: None,
    }
}

#[derive(Default)]
struct MockRpcState {
    head: u64,
    logs: Vec<Log>,
    blocks: HashMap<B256, Block>,
    transactions: HashMap<B256, Transaction>,
    receipts: HashMap<B256, TransactionReceipt>,
    scripted_log_failures: VecDeque<RpcFailure>,
    fail_all_logs: Option<RpcFailure>,
    block_lookup_failure: Option<RpcFailure>,
    log_calls: Vec<(u64, u64)>,
    head_calls: u32,
}

/// Scriptable in-memory [`EventRpc`] implementation.
///
/// Serves logs by block range from an internal list, can fail `logs`
/// calls on demand (a fixed script of failures, or every call), and
/// records every call for assertions. Shared via `Arc` so tests can
/// mutate chain state while a watcher owns the fetcher.
#[derive(Default)]
pub struct MockRpc {
    state: Mutex<MockRpcState>,
}

impl MockRpc {
    /// Create a mock with the given chain head and no logs.
    pub fn new(head: u64) -> Arc<Self> {
        let mock = Self::default();
        mock.state.lock().unwrap().head = head;
        Arc::new(mock)
    }

    /// Advance (or rewind) the chain head.
    pub fn set_head(&self, head: u64) {
        self.state.lock().unwrap().head = head;
    }

    /// Add a log to the served set.
    pub fn push_log(&self, log: Log) {
        self.state.lock().unwrap().logs.push(log);
    }

    /// Register a block for `block_by_hash`.
    pub fn insert_block(&self, block: Block) {
        let hash = block.header.hash;
        self.state.lock().unwrap().blocks.insert(hash, block);
    }

    /// Register a transaction for `transaction_by_hash` under `hash`.
    pub fn insert_transaction(&self, hash: B256, transaction: Transaction) {
        self.state
            .lock()
            .unwrap()
            .transactions
            .insert(hash, transaction);
    }

    /// Register a receipt for `transaction_receipt`, keyed by its
    /// transaction hash.
    pub fn insert_receipt(&self, receipt: TransactionReceipt) {
        let hash = receipt.transaction_hash;
        self.state.lock().unwrap().receipts.insert(hash, receipt);
    }

    /// Make every `block_by_hash` call fail with this failure.
    pub fn fail_block_lookups(&self, failure: RpcFailure) {
        self.state.lock().unwrap().block_lookup_failure = Some(failure);
    }

    /// Queue a failure to be returned by upcoming `logs` calls, before
    /// any successes.
    pub fn queue_log_failure(&self, failure: RpcFailure) {
        self.state
            .lock()
            .unwrap()
            .scripted_log_failures
            .push_back(failure);
    }

    /// Make every `logs` call fail with this failure.
    pub fn fail_all_logs(&self, failure: RpcFailure) {
        self.state.lock().unwrap().fail_all_logs = Some(failure);
    }

    /// Stop failing `logs` calls.
    pub fn clear_log_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_all_logs = None;
        state.scripted_log_failures.clear();
    }

    /// Every `logs` call made so far, as `(from_block, to_block)` pairs,
    /// failed attempts included.
    pub fn log_calls(&self) -> Vec<(u64, u64)> {
        self.state.lock().unwrap().log_calls.clone()
    }

    /// Number of `block_number` calls made so far.
    pub fn head_calls(&self) -> u32 {
        self.state.lock().unwrap().head_calls
    }
}

#[async_trait]
impl EventRpc for MockRpc {
    async fn block_number(&self) -> Result<u64, RpcFailure> {
        let mut state = self.state.lock().unwrap();
        state.head_calls += 1;
        Ok(state.head)
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, RpcFailure> {
        let from = filter.get_from_block().expect("filter must set from_block");
        let to = filter.get_to_block().expect("filter must set to_block");

        let mut state = self.state.lock().unwrap();
        state.log_calls.push((from, to));

        if let Some(failure) = &state.fail_all_logs {
            return Err(failure.clone());
        }
        if let Some(failure) = state.scripted_log_failures.pop_front() {
            return Err(failure);
        }

        Ok(state
            .logs
            .iter()
            .filter(|log| {
                log.block_number
                    .is_some_and(|number| number >= from && number <= to)
            })
            .cloned()
            .collect())
    }

    async fn block_by_hash(&self, hash: B256) -> Result<Option<Block>, RpcFailure> {
        let state = self.state.lock().unwrap();
        if let Some(failure) = &state.block_lookup_failure {
            return Err(failure.clone());
        }
        Ok(state.blocks.get(&hash).cloned())
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, RpcFailure> {
        Ok(self.state.lock().unwrap().transactions.get(&hash).cloned())
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcFailure> {
        Ok(self.state.lock().unwrap().receipts.get(&hash).cloned())
    }
}
