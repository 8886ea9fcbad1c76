//! Fork-aware chain tree.
//!
//! This module brings together the epoch processor and the pending pool.
//! Every registered block owns the ledger snapshot derived from its parent's,
//! so competing branches never see each other's spends.

use crate::checkpoint::Checkpoint;
use crate::epoch::EpochProcessor;
use crate::mempool::{PoolConfig, TransactionPool};
use forkchain_consensus::OrderingError;
use forkchain_core::{Block, Ed25519Verifier, Hash, SignatureVerifier, Transaction, UnspentOutputSet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Reasons a block is refused by [`ChainTree::add_block`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block has no parent hash")]
    MissingParentHash,

    #[error("block already in chain: {0}")]
    DuplicateBlock(Hash),

    #[error("unknown parent block: {0}")]
    UnknownParent(Hash),

    #[error("parent at height {parent_height} is too far behind deepest height {deepest_height}")]
    StaleParent {
        parent_height: u64,
        deepest_height: u64,
    },

    #[error("dependency ordering failed: {0}")]
    DependencyCycle(#[from] OrderingError),

    #[error("only {accepted} of {submitted} transactions are valid")]
    PartialBlockRejection { accepted: usize, submitted: usize },
}

pub type Result<T> = std::result::Result<T, BlockError>;

/// Chain tree configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// How far behind the deepest block a new block's parent may be.
    pub cutoff_age: u64,
    /// Drop nodes that can no longer be extended after each accepted block.
    pub prune: bool,
    /// Pending pool configuration.
    pub pool: PoolConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            cutoff_age: 10,
            prune: true,
            pool: PoolConfig::default(),
        }
    }
}

/// A registered block and the ledger state after it.
#[derive(Debug, Clone)]
pub struct ChainNode {
    /// The block itself.
    pub block: Block,
    /// Parent block hash (`None` for genesis).
    pub parent: Option<Hash>,
    /// Distance from genesis, genesis being 1.
    pub height: u64,
    /// Unspent outputs after applying this block.
    pub utxos: Arc<UnspentOutputSet>,
}

/// Tree of blocks rooted at genesis, tracking the deepest branch.
#[derive(Debug)]
pub struct ChainTree<V = Ed25519Verifier> {
    /// Nodes indexed by block hash.
    nodes: HashMap<Hash, ChainNode>,
    /// Hash of the deepest node.
    deepest: Hash,
    /// Transactions waiting for inclusion.
    pool: TransactionPool,
    /// Per-block ledger derivation.
    processor: EpochProcessor<V>,
    /// Configuration.
    config: ChainConfig,
    /// Nodes dropped by pruning so far.
    pruned: usize,
}

impl ChainTree<Ed25519Verifier> {
    /// Create a chain rooted at `genesis` with default configuration.
    pub fn new(genesis: Block) -> Self {
        Self::with_config(genesis, ChainConfig::default())
    }

    /// Create a chain rooted at `genesis`.
    pub fn with_config(genesis: Block, config: ChainConfig) -> Self {
        Self::with_verifier(genesis, config, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> ChainTree<V> {
    /// Create a chain with a custom signature verifier.
    ///
    /// The genesis block is trusted: its transactions go through one epoch
    /// against an empty ledger and whatever lands is kept.
    pub fn with_verifier(genesis: Block, config: ChainConfig, verifier: V) -> Self {
        let processor = EpochProcessor::with_verifier(verifier);
        let mut utxos = UnspentOutputSet::new();
        if let Err(err) = processor.handle_txs(genesis.transactions(), &mut utxos) {
            warn!(%err, "genesis transactions dropped");
            utxos = UnspentOutputSet::new();
        }
        insert_coinbase(&genesis, &mut utxos);

        let deepest = genesis.hash();
        let node = ChainNode {
            block: genesis,
            parent: None,
            height: 1,
            utxos: Arc::new(utxos),
        };

        let mut nodes = HashMap::new();
        nodes.insert(deepest, node);

        Self {
            nodes,
            deepest,
            pool: TransactionPool::with_config(config.pool.clone()),
            processor,
            config,
            pruned: 0,
        }
    }

    /// Get the chain configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Add a block on top of a known parent.
    ///
    /// The block lands only if every one of its transactions is accepted
    /// against the parent's ledger. A refused block leaves the tree and the
    /// pending pool untouched.
    pub fn add_block(&mut self, block: Block) -> Result<Hash> {
        let block_hash = block.hash();
        let node = match self.derive_node(&block_hash, block) {
            Ok(node) => node,
            Err(err) => {
                warn!(block = %block_hash.short(), %err, "block rejected");
                return Err(err);
            }
        };

        let height = node.height;
        let included: Vec<Hash> = node.block.transactions().iter().map(Transaction::hash).collect();
        self.nodes.insert(block_hash, node);
        info!(
            block = %block_hash.short(),
            height,
            txs = included.len(),
            "block accepted"
        );

        if height > self.deepest_height() {
            self.deepest = block_hash;
            info!(block = %block_hash.short(), height, "new deepest block");
        }

        self.pool.remove_batch(&included);

        if self.config.prune {
            self.prune();
        }

        Ok(block_hash)
    }

    /// Build the node for `block` without touching the tree.
    fn derive_node(&self, block_hash: &Hash, block: Block) -> Result<ChainNode> {
        let parent_hash = *block.prev_hash().ok_or(BlockError::MissingParentHash)?;

        if self.nodes.contains_key(block_hash) {
            return Err(BlockError::DuplicateBlock(*block_hash));
        }

        let parent = self
            .nodes
            .get(&parent_hash)
            .ok_or(BlockError::UnknownParent(parent_hash))?;

        let deepest_height = self.deepest_height();
        if parent.height + 1 <= self.stale_limit() {
            return Err(BlockError::StaleParent {
                parent_height: parent.height,
                deepest_height,
            });
        }

        let mut utxos = UnspentOutputSet::clone(&parent.utxos);
        let outcome = self.processor.handle_txs(block.transactions(), &mut utxos)?;

        let submitted = block.tx_count();
        if !outcome.accepted_all(submitted) {
            return Err(BlockError::PartialBlockRejection {
                accepted: outcome.accepted.len(),
                submitted,
            });
        }

        insert_coinbase(&block, &mut utxos);

        Ok(ChainNode {
            block,
            parent: Some(parent_hash),
            height: parent.height + 1,
            utxos: Arc::new(utxos),
        })
    }

    /// A new block's height must exceed this.
    fn stale_limit(&self) -> u64 {
        self.deepest_height().saturating_sub(self.config.cutoff_age)
    }

    /// Drop every node no future block may extend.
    fn prune(&mut self) {
        let limit = self.stale_limit();
        let before = self.nodes.len();
        self.nodes.retain(|_, node| node.height + 1 > limit);

        let removed = before - self.nodes.len();
        if removed > 0 {
            self.pruned += removed;
            debug!(removed, remaining = self.nodes.len(), "pruned stale nodes");
        }
    }

    fn deepest_node(&self) -> &ChainNode {
        &self.nodes[&self.deepest]
    }

    /// Get the deepest block. Ties keep the block that arrived first.
    pub fn deepest_block(&self) -> &Block {
        &self.deepest_node().block
    }

    /// Get the ledger to build the next block on.
    pub fn deepest_utxo_set(&self) -> Arc<UnspentOutputSet> {
        Arc::clone(&self.deepest_node().utxos)
    }

    /// Get the height of the deepest block.
    pub fn deepest_height(&self) -> u64 {
        self.deepest_node().height
    }

    /// Get the hash of the deepest block.
    pub fn deepest_hash(&self) -> Hash {
        self.deepest
    }

    /// Get the pending transaction pool.
    pub fn pending_pool(&self) -> &TransactionPool {
        &self.pool
    }

    /// Get mutable access to the pending transaction pool.
    pub fn pending_pool_mut(&mut self) -> &mut TransactionPool {
        &mut self.pool
    }

    /// Queue a transaction for inclusion.
    ///
    /// No ledger check happens here; validity is decided when a block
    /// carrying the transaction is added. A pending copy with the same hash
    /// is replaced. Returns the transaction evicted from a full pool.
    pub fn add_transaction(&mut self, tx: Transaction) -> Option<Transaction> {
        self.pool.add(tx)
    }

    /// Check if a block is registered.
    pub fn contains_block(&self, block_hash: &Hash) -> bool {
        self.nodes.contains_key(block_hash)
    }

    /// Get a registered node by block hash.
    pub fn node(&self, block_hash: &Hash) -> Option<&ChainNode> {
        self.nodes.get(block_hash)
    }

    /// Get a registered block by hash.
    pub fn block(&self, block_hash: &Hash) -> Option<&Block> {
        self.nodes.get(block_hash).map(|node| &node.block)
    }

    /// Get the ledger after a given block.
    pub fn utxo_set(&self, block_hash: &Hash) -> Option<Arc<UnspentOutputSet>> {
        self.nodes.get(block_hash).map(|node| Arc::clone(&node.utxos))
    }

    /// Get the height of a registered block.
    pub fn height_of(&self, block_hash: &Hash) -> Option<u64> {
        self.nodes.get(block_hash).map(|node| node.height)
    }

    /// Get the number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Hashes of registered blocks with no registered children, deepest first.
    pub fn tips(&self) -> Vec<Hash> {
        let parents: HashSet<&Hash> = self.nodes.values().filter_map(|n| n.parent.as_ref()).collect();
        let mut tips: Vec<(&Hash, &ChainNode)> = self
            .nodes
            .iter()
            .filter(|(hash, _)| !parents.contains(hash))
            .collect();
        tips.sort_by(|(ha, a), (hb, b)| b.height.cmp(&a.height).then(ha.cmp(hb)));
        tips.into_iter().map(|(hash, _)| *hash).collect()
    }

    /// Snapshot the deepest block's ledger.
    pub fn checkpoint(&self) -> Checkpoint {
        let node = self.deepest_node();
        Checkpoint::new(node.height, self.deepest, UnspentOutputSet::clone(&node.utxos))
    }

    /// Get chain statistics.
    pub fn stats(&self) -> ChainStats {
        let deepest = self.deepest_node();
        ChainStats {
            deepest_height: deepest.height,
            deepest_hash: self.deepest,
            node_count: self.nodes.len(),
            tip_count: self.tips().len(),
            pruned_nodes: self.pruned,
            unspent_outputs: deepest.utxos.len(),
            pending_transactions: self.pool.len(),
        }
    }
}

/// Insert the block's coinbase output, unconditionally.
fn insert_coinbase(block: &Block, utxos: &mut UnspentOutputSet) {
    let coinbase = block.coinbase();
    if let Some(output) = coinbase.outputs().first() {
        utxos.insert(coinbase.output_id(0), *output);
    }
}

/// Chain statistics.
#[derive(Debug, Clone)]
pub struct ChainStats {
    /// Height of the deepest block.
    pub deepest_height: u64,
    /// Hash of the deepest block.
    pub deepest_hash: Hash,
    /// Registered nodes.
    pub node_count: usize,
    /// Nodes without children.
    pub tip_count: usize,
    /// Nodes dropped by pruning.
    pub pruned_nodes: usize,
    /// Unspent outputs on the deepest branch.
    pub unspent_outputs: usize,
    /// Number of pending transactions.
    pub pending_transactions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkchain_core::{Keypair, OutputId, PublicKey, Signature};

    #[derive(Debug)]
    struct RejectAll;

    impl SignatureVerifier for RejectAll {
        fn verify(&self, _: &PublicKey, _: &[u8], _: &Signature) -> bool {
            false
        }
    }

    #[derive(Debug)]
    struct AcceptAll;

    impl SignatureVerifier for AcceptAll {
        fn verify(&self, _: &PublicKey, _: &[u8], _: &Signature) -> bool {
            true
        }
    }

    fn setup_chain(config: ChainConfig) -> (ChainTree, Block, Keypair) {
        let alice = Keypair::generate();
        let genesis = Block::genesis(alice.public_key, 25);
        let chain = ChainTree::with_config(genesis.clone(), config);
        (chain, genesis, alice)
    }

    fn pay(from: &Keypair, coin: OutputId, values: &[i64]) -> Transaction {
        let mut tx = Transaction::new();
        tx.add_input(coin);
        for value in values {
            tx.add_output(*value, from.public_key);
        }
        tx.signed(from)
    }

    /// Extend `parent` with `count` empty blocks, returning the last hash.
    fn extend(chain: &mut ChainTree, parent: Hash, count: usize, miner: &Keypair) -> Hash {
        (0..count).fold(parent, |prev, _| {
            chain.add_block(Block::new(prev, miner.public_key)).unwrap()
        })
    }

    #[test]
    fn test_chain_init() {
        let (chain, genesis, alice) = setup_chain(ChainConfig::default());

        assert_eq!(chain.deepest_height(), 1);
        assert_eq!(chain.deepest_block(), &genesis);
        let utxos = chain.deepest_utxo_set();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos.balance_of(&alice.public_key), 25);
    }

    #[test]
    fn test_empty_block_mints_coinbase() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let block = Block::new(genesis.hash(), alice.public_key);
        let coin = block.coinbase().output_id(0);

        let hash = chain.add_block(block).unwrap();

        assert_eq!(chain.deepest_hash(), hash);
        assert_eq!(chain.deepest_height(), 2);
        assert!(chain.deepest_utxo_set().contains(&coin));
        assert_eq!(chain.deepest_utxo_set().len(), 2);
    }

    #[test]
    fn test_block_without_parent_rejected() {
        let (mut chain, _, alice) = setup_chain(ChainConfig::default());
        let orphan = Block::genesis(alice.public_key, 25);

        assert_eq!(chain.add_block(orphan), Err(BlockError::MissingParentHash));
        assert_eq!(chain.node_count(), 1);
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let (mut chain, _, alice) = setup_chain(ChainConfig::default());
        let unknown = forkchain_core::hash(b"nowhere");

        assert_eq!(
            chain.add_block(Block::new(unknown, alice.public_key)),
            Err(BlockError::UnknownParent(unknown))
        );
        assert_eq!(chain.deepest_height(), 1);
    }

    #[test]
    fn test_duplicate_block_rejected() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let block = Block::new(genesis.hash(), alice.public_key);

        let hash = chain.add_block(block.clone()).unwrap();
        assert_eq!(chain.add_block(block), Err(BlockError::DuplicateBlock(hash)));
    }

    #[test]
    fn test_block_with_valid_transaction() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let bob = Keypair::generate();

        let mut tx = Transaction::new();
        tx.add_input(genesis.coinbase().output_id(0))
            .add_output(20, bob.public_key)
            .add_output(5, alice.public_key);
        let tx = tx.signed(&alice);

        let block = Block::new(genesis.hash(), alice.public_key).with_transactions([tx.clone()]);
        chain.add_block(block).unwrap();

        let utxos = chain.deepest_utxo_set();
        assert_eq!(utxos.balance_of(&bob.public_key), 20);
        assert_eq!(utxos.balance_of(&alice.public_key), 5 + 25);
        assert!(!utxos.contains(&genesis.coinbase().output_id(0)));
    }

    #[test]
    fn test_partial_block_rejected_without_mutation() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let coin = genesis.coinbase().output_id(0);
        let good = pay(&alice, coin, &[25]);
        let overspend = pay(&alice, good.output_id(0), &[26]);

        let block =
            Block::new(genesis.hash(), alice.public_key).with_transactions([good, overspend]);
        assert_eq!(
            chain.add_block(block),
            Err(BlockError::PartialBlockRejection {
                accepted: 1,
                submitted: 2
            })
        );
        assert_eq!(chain.node_count(), 1);
        assert!(chain.deepest_utxo_set().contains(&coin));
    }

    #[test]
    fn test_double_spend_block_rejected() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let coin = genesis.coinbase().output_id(0);
        let first = pay(&alice, coin, &[20]);
        let second = pay(&alice, coin, &[10]);

        let block = Block::new(genesis.hash(), alice.public_key).with_transactions([first, second]);
        assert!(matches!(
            chain.add_block(block),
            Err(BlockError::PartialBlockRejection { accepted: 1, .. })
        ));
    }

    #[test]
    fn test_pending_pool_cleanup() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let coin = genesis.coinbase().output_id(0);
        let included = pay(&alice, coin, &[25]);
        let waiting = pay(&alice, coin, &[24]);

        chain.add_transaction(included.clone());
        chain.add_transaction(waiting.clone());

        let block = Block::new(genesis.hash(), alice.public_key).with_transactions([included]);
        chain.add_block(block).unwrap();

        assert_eq!(chain.pending_pool().get_all(), vec![waiting]);
    }

    #[test]
    fn test_rejected_block_leaves_pool_untouched() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let coin = genesis.coinbase().output_id(0);
        let bad = pay(&alice, coin, &[26]);
        chain.add_transaction(bad.clone());

        let block = Block::new(genesis.hash(), alice.public_key).with_transactions([bad]);
        assert!(matches!(
            chain.add_block(block),
            Err(BlockError::PartialBlockRejection { .. })
        ));
        assert_eq!(chain.pending_pool().len(), 1);
    }

    #[test]
    fn test_stale_parent_rejected() {
        let config = ChainConfig {
            cutoff_age: 2,
            prune: false,
            ..ChainConfig::default()
        };
        let (mut chain, genesis, alice) = setup_chain(config);
        extend(&mut chain, genesis.hash(), 3, &alice);
        assert_eq!(chain.deepest_height(), 4);

        // Child of genesis would sit at height 2 <= 4 - 2.
        let stale = Block::new(genesis.hash(), Keypair::generate().public_key);
        assert_eq!(
            chain.add_block(stale),
            Err(BlockError::StaleParent {
                parent_height: 1,
                deepest_height: 4
            })
        );
        assert_eq!(chain.deepest_height(), 4);
    }

    #[test]
    fn test_cutoff_boundary_accepts() {
        let config = ChainConfig {
            cutoff_age: 2,
            prune: false,
            ..ChainConfig::default()
        };
        let (mut chain, genesis, alice) = setup_chain(config);
        let first = extend(&mut chain, genesis.hash(), 1, &alice);
        extend(&mut chain, first, 2, &alice);

        // Child of height 2 would sit at height 3 > 4 - 2.
        let fork = Block::new(first, Keypair::generate().public_key);
        assert!(chain.add_block(fork).is_ok());
    }

    #[test]
    fn test_fork_tips_and_first_deepest_kept() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let bob = Keypair::generate();

        let left = chain.add_block(Block::new(genesis.hash(), alice.public_key)).unwrap();
        let right = chain.add_block(Block::new(genesis.hash(), bob.public_key)).unwrap();

        assert_eq!(chain.deepest_hash(), left);
        let tips = chain.tips();
        assert_eq!(tips.len(), 2);
        assert!(tips.contains(&left) && tips.contains(&right));

        let longer = chain.add_block(Block::new(right, bob.public_key)).unwrap();
        assert_eq!(chain.deepest_hash(), longer);
        assert_eq!(chain.tips()[0], longer);
    }

    #[test]
    fn test_branches_keep_separate_ledgers() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let coin = genesis.coinbase().output_id(0);
        let to_self = pay(&alice, coin, &[25]);
        let burn = pay(&alice, coin, &[1]);

        let left = Block::new(genesis.hash(), alice.public_key).with_transactions([to_self.clone()]);
        let right = Block::new(genesis.hash(), alice.public_key).with_transactions([burn.clone()]);
        let left = chain.add_block(left).unwrap();
        let right = chain.add_block(right).unwrap();

        assert!(chain.utxo_set(&left).unwrap().contains(&to_self.output_id(0)));
        assert!(!chain.utxo_set(&left).unwrap().contains(&burn.output_id(0)));
        assert!(chain.utxo_set(&right).unwrap().contains(&burn.output_id(0)));
    }

    #[test]
    fn test_pruning_drops_unextendable_nodes() {
        let config = ChainConfig {
            cutoff_age: 2,
            ..ChainConfig::default()
        };
        let (mut chain, genesis, alice) = setup_chain(config);
        let genesis_utxos = chain.deepest_utxo_set();

        extend(&mut chain, genesis.hash(), 3, &alice);

        assert!(!chain.contains_block(&genesis.hash()));
        assert_eq!(chain.node_count(), 3);
        assert_eq!(chain.stats().pruned_nodes, 1);
        assert_eq!(genesis_utxos.len(), 1);

        let late = Block::new(genesis.hash(), Keypair::generate().public_key);
        assert_eq!(
            chain.add_block(late),
            Err(BlockError::UnknownParent(genesis.hash()))
        );
    }

    #[test]
    fn test_duplicate_checked_before_parent_lookup() {
        let config = ChainConfig {
            cutoff_age: 2,
            ..ChainConfig::default()
        };
        let (mut chain, genesis, alice) = setup_chain(config);
        let first = Block::new(genesis.hash(), alice.public_key);
        let first_hash = chain.add_block(first.clone()).unwrap();
        extend(&mut chain, first_hash, 2, &alice);

        // Genesis is pruned, the block on top of it is not.
        assert!(!chain.contains_block(&genesis.hash()));
        assert!(chain.contains_block(&first_hash));
        assert_eq!(
            chain.add_block(first),
            Err(BlockError::DuplicateBlock(first_hash))
        );
    }

    #[test]
    fn test_honest_copy_replaces_forged_pending_copy() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let mallory = Keypair::generate();

        let mut body = Transaction::new();
        body.add_input(genesis.coinbase().output_id(0))
            .add_output(25, alice.public_key);
        assert!(chain.add_transaction(body.clone().signed(&mallory)).is_none());
        assert!(chain.add_transaction(body.signed(&alice)).is_none());

        let pending = chain.pending_pool().get_all();
        assert_eq!(pending.len(), 1);
        let block = Block::new(genesis.hash(), alice.public_key).with_transactions(pending);
        assert!(chain.add_block(block).is_ok());
        assert!(chain.pending_pool().is_empty());
    }

    #[test]
    fn test_custom_verifier_decides_signatures() {
        let alice = Keypair::generate();
        let genesis = Block::genesis(alice.public_key, 25);
        let coin = genesis.coinbase().output_id(0);

        let mut strict = ChainTree::with_verifier(genesis.clone(), ChainConfig::default(), RejectAll);
        let signed = pay(&alice, coin, &[25]);
        let block = Block::new(genesis.hash(), alice.public_key).with_transactions([signed]);
        assert_eq!(
            strict.add_block(block),
            Err(BlockError::PartialBlockRejection {
                accepted: 0,
                submitted: 1
            })
        );
        assert!(strict
            .add_block(Block::new(genesis.hash(), alice.public_key))
            .is_ok());

        let mut lenient = ChainTree::with_verifier(genesis.clone(), ChainConfig::default(), AcceptAll);
        let mallory = Keypair::generate();
        let theft = pay(&mallory, coin, &[25]);
        let block = Block::new(genesis.hash(), mallory.public_key).with_transactions([theft]);
        assert!(lenient.add_block(block).is_ok());
        assert_eq!(lenient.deepest_utxo_set().balance_of(&mallory.public_key), 50);
    }

    #[test]
    fn test_invalid_signature_block_rejected() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        let mallory = Keypair::generate();
        let theft = pay(&mallory, genesis.coinbase().output_id(0), &[25]);
        assert!(chain.deepest_utxo_set().contains(&genesis.coinbase().output_id(0)));

        let block = Block::new(genesis.hash(), alice.public_key).with_transactions([theft]);
        assert_eq!(
            chain.add_block(block),
            Err(BlockError::PartialBlockRejection {
                accepted: 0,
                submitted: 1
            })
        );
    }

    #[test]
    fn test_chain_stats() {
        let (mut chain, genesis, alice) = setup_chain(ChainConfig::default());
        extend(&mut chain, genesis.hash(), 2, &alice);

        let stats = chain.stats();
        assert_eq!(stats.deepest_height, 3);
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.tip_count, 1);
        assert_eq!(stats.unspent_outputs, 3);
        assert_eq!(stats.pending_transactions, 0);
    }
}
