// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Contract metadata resolution.
//!
//! Queries name contracts logically ("YourContract") rather than by
//! address, so deployments can move without touching query code. A
//! [`ContractRegistry`] resolves those names to an address plus ABI.
//!
//! Resolution may lag behind the first fetch cycle: registries backed by
//! deployment artifacts or remote metadata can report
//! [`RegistryLookup::Loading`] while they warm up, and the fetcher skips
//! the cycle silently instead of erroring. This avoids a burst of
//! failures while metadata is still on its way.

use std::{collections::HashMap, sync::Arc};

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;

/// Deployed contract metadata: where it lives and how to decode it.
#[derive(Debug, Clone)]
pub struct ContractMetadata {
    /// Deployed contract address.
    pub address: Address,
    /// Contract ABI.
    pub abi: JsonAbi,
}

/// Outcome of resolving a logical contract name.
#[derive(Debug, Clone)]
pub enum RegistryLookup {
    /// The registry has not finished loading its metadata yet.
    Loading,
    /// The registry is loaded but does not know this contract.
    Missing,
    /// Resolved metadata.
    Ready(Arc<ContractMetadata>),
}

/// Resolves logical contract names to deployed metadata.
pub trait ContractRegistry: Send + Sync {
    /// Look up a contract by its logical name.
    fn resolve(&self, contract_name: &str) -> RegistryLookup;
}

/// In-memory registry over a fixed set of deployments.
///
/// # Examples
///
/// ```rust,ignore
/// use event_history::{ContractMetadata, StaticContractRegistry};
///
/// let mut registry = StaticContractRegistry::new();
/// registry.insert("YourContract", ContractMetadata { address, abi });
/// ```
#[derive(Debug, Default)]
pub struct StaticContractRegistry {
    contracts: HashMap<String, Arc<ContractMetadata>>,
}

impl StaticContractRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract under a logical name, replacing any previous
    /// entry with that name.
    pub fn insert(&mut self, name: impl Into<String>, metadata: ContractMetadata) {
        self.contracts.insert(name.into(), Arc::new(metadata));
    }

    /// Number of registered contracts.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// True if no contracts are registered.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl ContractRegistry for StaticContractRegistry {
    fn resolve(&self, contract_name: &str) -> RegistryLookup {
        match self.contracts.get(contract_name) {
            Some(metadata) => RegistryLookup::Ready(Arc::clone(metadata)),
            None => RegistryLookup::Missing,
        }
    }
}
