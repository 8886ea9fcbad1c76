//! Ledger orchestration for forkchain.
//!
//! This crate brings together the acceptance rules and a fork-aware chain:
//! - **Epoch**: turns an unordered batch into an accepted subset and applies it
//! - **Mempool**: pool of transactions waiting for a block
//! - **Blockchain**: tree of blocks, each owning the ledger after it, with a
//!   cutoff age bounding how far behind the deepest block a fork may start
//! - **Shared**: lock-protected handle for multi-threaded callers
//! - **Checkpoint**: bincode snapshot of the deepest ledger
//!
//! # Example
//!
//! ```rust,no_run
//! use forkchain_chain::{ChainConfig, ChainTree};
//! use forkchain_core::{Block, Keypair, Transaction};
//!
//! let miner = Keypair::generate();
//! let genesis = Block::genesis(miner.public_key, 25);
//! let mut chain = ChainTree::with_config(genesis.clone(), ChainConfig::default());
//!
//! // Spend the genesis reward in the next block
//! let mut tx = Transaction::new();
//! tx.add_input(genesis.coinbase().output_id(0))
//!     .add_output(25, miner.public_key);
//! let tx = tx.signed(&miner);
//!
//! let block = Block::new(genesis.hash(), miner.public_key).with_transactions([tx]);
//! chain.add_block(block).unwrap();
//! assert_eq!(chain.deepest_height(), 2);
//! ```

pub mod blockchain;
pub mod checkpoint;
pub mod epoch;
pub mod mempool;
pub mod shared;

// Re-export commonly used types
pub use blockchain::{BlockError, ChainConfig, ChainNode, ChainStats, ChainTree};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use epoch::{EpochOutcome, EpochProcessor, RejectReason, RejectedTransaction};
pub use mempool::{PoolConfig, PoolError, PoolStats, TransactionPool};
pub use shared::SharedChainTree;
