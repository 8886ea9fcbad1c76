//! Thread-safe handle to a [`ChainTree`].
//!
//! One lock covers the node map, the deepest pointer and the pending pool,
//! since every mutation touches all three. Ledger snapshots are handed out
//! as `Arc`s and can be read after the lock is released.

use crate::blockchain::{ChainStats, ChainTree, Result};
use crate::checkpoint::Checkpoint;
use forkchain_core::{Block, Ed25519Verifier, Hash, SignatureVerifier, Transaction, UnspentOutputSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable, lock-protected chain tree.
#[derive(Debug)]
pub struct SharedChainTree<V = Ed25519Verifier> {
    inner: Arc<RwLock<ChainTree<V>>>,
}

impl<V> Clone for SharedChainTree<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: SignatureVerifier> SharedChainTree<V> {
    /// Wrap a chain tree.
    pub fn new(tree: ChainTree<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Get shared access to the tree.
    // Poisoning is ignored: the tree never holds a half-registered node.
    pub fn read(&self) -> RwLockReadGuard<'_, ChainTree<V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get exclusive access to the tree.
    pub fn write(&self) -> RwLockWriteGuard<'_, ChainTree<V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a block. See [`ChainTree::add_block`].
    pub fn add_block(&self, block: Block) -> Result<Hash> {
        self.write().add_block(block)
    }

    /// Queue a transaction. See [`ChainTree::add_transaction`].
    pub fn add_transaction(&self, tx: Transaction) -> Option<Transaction> {
        self.write().add_transaction(tx)
    }

    /// Get a copy of the deepest block.
    pub fn deepest_block(&self) -> Block {
        self.read().deepest_block().clone()
    }

    /// Get the deepest ledger; the snapshot outlives the lock.
    pub fn deepest_utxo_set(&self) -> Arc<UnspentOutputSet> {
        self.read().deepest_utxo_set()
    }

    /// Get the height of the deepest block.
    pub fn deepest_height(&self) -> u64 {
        self.read().deepest_height()
    }

    /// Get every pending transaction in arrival order.
    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.read().pending_pool().get_all()
    }

    /// Snapshot the deepest ledger.
    pub fn checkpoint(&self) -> Checkpoint {
        self.read().checkpoint()
    }

    /// Get chain statistics.
    pub fn stats(&self) -> ChainStats {
        self.read().stats()
    }
}

impl<V: SignatureVerifier> From<ChainTree<V>> for SharedChainTree<V> {
    fn from(tree: ChainTree<V>) -> Self {
        Self::new(tree)
    }
}
