//! Pending transaction pool.
//!
//! The pool stores proposed transactions waiting to be included in a block.
//! Nothing is validated on insertion; ledger checks happen when a block
//! carrying the transaction is added to the chain. Insertion never fails:
//! a repeated hash replaces the stored copy and a full pool evicts its
//! oldest entry.

use forkchain_core::{Hash, OutputId, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("transaction not found in pool")]
    TransactionNotFound,
}

pub type Result<T> = std::result::Result<T, PoolError>;

/// Configuration for the pending pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of transactions in the pool. Reaching it evicts the
    /// oldest pending transaction.
    pub max_transactions: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_transactions: 10_000,
        }
    }
}

/// Pool of transactions proposed but not yet included in a block.
#[derive(Debug)]
pub struct TransactionPool {
    /// Configuration.
    config: PoolConfig,
    /// Transactions indexed by hash.
    transactions: HashMap<Hash, Transaction>,
    /// Arrival order.
    order: VecDeque<Hash>,
    /// Which pending transactions claim each output.
    by_output: HashMap<OutputId, HashSet<Hash>>,
}

impl TransactionPool {
    /// Create a new pool with default configuration.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a new pool with the given configuration.
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            config,
            transactions: HashMap::new(),
            order: VecDeque::new(),
            by_output: HashMap::new(),
        }
    }

    /// Get the number of pending transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Check if a transaction is pending.
    pub fn contains(&self, tx_hash: &Hash) -> bool {
        self.transactions.contains_key(tx_hash)
    }

    /// Get a pending transaction by hash.
    pub fn get(&self, tx_hash: &Hash) -> Option<&Transaction> {
        self.transactions.get(tx_hash)
    }

    /// Add a transaction to the pool.
    ///
    /// The hash leaves signatures out, so a pending transaction with the same
    /// hash is replaced by the new copy and keeps its arrival slot. Adding a
    /// new hash to a full pool evicts the oldest transaction and returns it.
    pub fn add(&mut self, tx: Transaction) -> Option<Transaction> {
        let tx_hash = tx.hash();

        // Same hash, same inputs: the output index is still accurate.
        if let Some(stored) = self.transactions.get_mut(&tx_hash) {
            debug!(tx = %tx_hash.short(), "pending copy replaced");
            *stored = tx;
            return None;
        }

        let evicted = if self.transactions.len() >= self.config.max_transactions.max(1) {
            self.evict_oldest()
        } else {
            None
        };

        for input in tx.inputs() {
            self.by_output.entry(input.prev).or_default().insert(tx_hash);
        }
        self.order.push_back(tx_hash);
        self.transactions.insert(tx_hash, tx);

        evicted
    }

    fn evict_oldest(&mut self) -> Option<Transaction> {
        let oldest = *self.order.front()?;
        let tx = self.remove(&oldest).ok()?;
        debug!(tx = %oldest.short(), "pool full, oldest transaction evicted");
        Some(tx)
    }

    /// Remove a transaction from the pool.
    pub fn remove(&mut self, tx_hash: &Hash) -> Result<Transaction> {
        let tx = self
            .transactions
            .remove(tx_hash)
            .ok_or(PoolError::TransactionNotFound)?;

        self.order.retain(|h| h != tx_hash);
        for input in tx.inputs() {
            if let Some(claimants) = self.by_output.get_mut(&input.prev) {
                claimants.remove(tx_hash);
                if claimants.is_empty() {
                    self.by_output.remove(&input.prev);
                }
            }
        }

        Ok(tx)
    }

    /// Remove every listed transaction that is present; absent ones are ignored.
    pub fn remove_batch(&mut self, tx_hashes: &[Hash]) -> usize {
        tx_hashes
            .iter()
            .filter(|hash| self.remove(hash).is_ok())
            .count()
    }

    /// Pending transactions claiming any output that `tx` also claims.
    pub fn conflicting(&self, tx: &Transaction) -> Vec<&Transaction> {
        let own = tx.hash();
        let hashes: HashSet<&Hash> = tx
            .inputs()
            .iter()
            .filter_map(|input| self.by_output.get(&input.prev))
            .flatten()
            .filter(|hash| **hash != own)
            .collect();
        self.order
            .iter()
            .filter(|hash| hashes.contains(hash))
            .filter_map(|hash| self.transactions.get(hash))
            .collect()
    }

    /// Up to `limit` transactions in arrival order, for block building.
    pub fn get_pending(&self, limit: usize) -> Vec<Transaction> {
        self.order
            .iter()
            .take(limit)
            .filter_map(|hash| self.transactions.get(hash).cloned())
            .collect()
    }

    /// All transactions in arrival order.
    pub fn get_all(&self) -> Vec<Transaction> {
        self.get_pending(self.order.len())
    }

    /// Clear all transactions from the pool.
    pub fn clear(&mut self) {
        self.transactions.clear();
        self.order.clear();
        self.by_output.clear();
    }

    /// Get pool statistics.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_transactions: self.len(),
            claimed_outputs: self.by_output.len(),
            contested_outputs: self.by_output.values().filter(|c| c.len() > 1).count(),
            capacity: self.config.max_transactions,
        }
    }
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool statistics.
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Total number of transactions.
    pub total_transactions: usize,
    /// Number of distinct outputs claimed by pending transactions.
    pub claimed_outputs: usize,
    /// Outputs claimed by more than one pending transaction.
    pub contested_outputs: usize,
    /// Pool capacity.
    pub capacity: usize,
}
