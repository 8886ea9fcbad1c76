//! Blocks: a parent link, regular transactions and one coinbase.

use crate::crypto::PublicKey;
use crate::hash::{hash_encoded, Hash};
use crate::transaction::Transaction;
use crate::utxo::Amount;
use serde::{Deserialize, Serialize};

/// Reward minted by the coinbase of every block built with [`Block::new`].
pub const COINBASE_REWARD: Amount = 25;

/// A block of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Hash of the parent block (`None` only for genesis).
    pub prev_hash: Option<Hash>,
    /// Regular transactions, applied as one epoch.
    pub transactions: Vec<Transaction>,
    /// Value-creating transaction with a single output.
    pub coinbase: Transaction,
}

/// The fields a block hash commits to.
#[derive(Serialize)]
struct BlockHeader {
    prev_hash: Option<Hash>,
    tx_hashes: Vec<Hash>,
    coinbase: Hash,
}

impl Block {
    /// Create an empty block on top of `prev_hash` paying the standard reward to `miner`.
    pub fn new(prev_hash: Hash, miner: PublicKey) -> Self {
        Self::with_reward(Some(prev_hash), miner, COINBASE_REWARD)
    }

    /// Create the genesis block.
    pub fn genesis(miner: PublicKey, reward: Amount) -> Self {
        Self::with_reward(None, miner, reward)
    }

    /// Create an empty block with an explicit coinbase reward.
    ///
    /// The coinbase nonce is taken from the parent hash so that sibling
    /// blocks paying the same miner still mint distinct outputs.
    pub fn with_reward(prev_hash: Option<Hash>, miner: PublicKey, reward: Amount) -> Self {
        let nonce = prev_hash
            .map(|h| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&h.0[..8]);
                u64::from_le_bytes(bytes)
            })
            .unwrap_or(0);
        Self {
            prev_hash,
            transactions: Vec::new(),
            coinbase: Transaction::coinbase(miner, reward, nonce),
        }
    }

    /// Append a regular transaction.
    pub fn add_transaction(&mut self, tx: Transaction) -> &mut Self {
        self.transactions.push(tx);
        self
    }

    /// Builder form of [`Block::add_transaction`].
    pub fn with_transactions(mut self, txs: impl IntoIterator<Item = Transaction>) -> Self {
        self.transactions.extend(txs);
        self
    }

    pub fn prev_hash(&self) -> Option<&Hash> {
        self.prev_hash.as_ref()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn coinbase(&self) -> &Transaction {
        &self.coinbase
    }

    /// Get the block hash.
    pub fn hash(&self) -> Hash {
        hash_encoded(&BlockHeader {
            prev_hash: self.prev_hash,
            tx_hashes: self.transactions.iter().map(Transaction::hash).collect(),
            coinbase: self.coinbase.hash(),
        })
    }

    /// Check if this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_none()
    }

    /// Get the number of regular transactions.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}
