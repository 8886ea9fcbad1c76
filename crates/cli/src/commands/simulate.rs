//! Fork simulation command.

use super::short;
use anyhow::{ensure, Result};
use clap::Args;
use colored::Colorize;
use forkchain_chain::{ChainConfig, ChainTree, EpochProcessor};
use forkchain_core::{Block, Hash, Keypair, OutputId, Transaction, UnspentOutputSet};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of blocks to propose
    #[arg(short, long, default_value = "30")]
    blocks: u64,

    /// Percentage of blocks built on a random tip instead of the deepest block
    #[arg(short, long, default_value = "25")]
    forks: u8,

    /// Percentage of blocks that try to land a double spend
    #[arg(short, long, default_value = "15")]
    double_spends: u8,

    /// How far behind the deepest block a fork may start
    #[arg(short, long, default_value = "10")]
    cutoff_age: u64,

    /// Number of participants
    #[arg(short, long, default_value = "4")]
    users: usize,

    /// Seed for keys and random choices
    #[arg(short, long, default_value = "42")]
    seed: u64,
}

/// Participants and the randomness driving them.
struct World {
    rng: StdRng,
    users: Vec<Keypair>,
}

impl World {
    fn new(seed: u64, users: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let users: Vec<Keypair> = (0..users)
            .map(|_| Keypair::from_private_key(&rng.gen()))
            .collect();
        Self { rng, users }
    }

    fn random_user(&mut self) -> usize {
        self.rng.gen_range(0..self.users.len())
    }

    fn owner_of(&self, utxos: &UnspentOutputSet, id: &OutputId) -> Option<&Keypair> {
        let owner = utxos.get(id)?.owner;
        self.users.iter().find(|kp| kp.public_key == owner)
    }

    /// Spend one output: pay a random user, keep change, leave a small fee.
    fn payment(&mut self, utxos: &UnspentOutputSet, coin: OutputId) -> Option<Transaction> {
        let value = utxos.get(&coin)?.value;
        if value <= 0 {
            return None;
        }
        let fee = self.rng.gen_range(0..=value.min(3));
        let amount = self.rng.gen_range(0..=value - fee);
        let to = self.random_user();

        let owner = self.owner_of(utxos, &coin)?;
        let mut tx = Transaction::new();
        tx.add_input(coin)
            .add_output(amount, self.users[to].public_key)
            .add_output(value - fee - amount, owner.public_key);
        Some(tx.signed(owner))
    }
}

pub fn run(args: SimulateArgs) -> Result<()> {
    ensure!(args.users > 0, "at least one participant is needed");
    ensure!(args.forks <= 100, "--forks is a percentage");
    ensure!(args.double_spends <= 100, "--double-spends is a percentage");

    let mut world = World::new(args.seed, args.users);
    let genesis = Block::genesis(world.users[0].public_key, 100);
    let config = ChainConfig {
        cutoff_age: args.cutoff_age,
        ..ChainConfig::default()
    };
    let mut chain = ChainTree::with_config(genesis.clone(), config);

    println!("{}", "Simulating forkchain...".bold().cyan());
    println!(
        "  Genesis {} pays {} to user 0, cutoff age {}",
        short(&genesis.hash()),
        "100".bright_cyan(),
        args.cutoff_age
    );
    println!();

    let mut accepted = 0u64;
    let mut rejected = 0u64;

    for round in 1..=args.blocks {
        let parent = choose_parent(&mut world, &chain, args.forks);
        let parent_utxos = match chain.utxo_set(&parent) {
            Some(utxos) => utxos,
            None => continue,
        };

        propose_payments(&mut world, &mut chain, &parent_utxos);

        let attack = world.rng.gen_range(0..100) < args.double_spends;
        let txs = if attack {
            double_spend(&mut world, &parent_utxos)
        } else {
            select_transactions(&chain, &parent_utxos)
        };

        let miner = world.random_user();
        let block =
            Block::new(parent, world.users[miner].public_key).with_transactions(txs.clone());
        let label = if attack { "double spend" } else { "block" };

        match chain.add_block(block) {
            Ok(hash) => {
                accepted += 1;
                println!(
                    "{}  #{:<3} {} {} on {} height {} ({} txs)",
                    "✓".green().bold(),
                    round,
                    label,
                    short(&hash),
                    short(&parent),
                    chain.height_of(&hash).unwrap_or_default(),
                    txs.len()
                );
            }
            Err(err) => {
                rejected += 1;
                println!(
                    "{}  #{:<3} {} on {} rejected: {}",
                    "✗".red().bold(),
                    round,
                    label,
                    short(&parent),
                    err.to_string().bright_black()
                );
            }
        }
    }

    let stats = chain.stats();
    println!();
    println!("{}", "Final state:".bold().cyan());
    println!("  Blocks accepted:   {}", accepted.to_string().green());
    println!("  Blocks rejected:   {}", rejected.to_string().red());
    println!("  Deepest block:     {}", short(&stats.deepest_hash));
    println!("  Deepest height:    {}", stats.deepest_height.to_string().bright_cyan());
    println!("  Live nodes:        {}", stats.node_count);
    println!("  Tips:              {}", stats.tip_count);
    println!("  Pruned nodes:      {}", stats.pruned_nodes);
    println!("  Unspent outputs:   {}", stats.unspent_outputs);
    println!("  Pending txs:       {}", stats.pending_transactions);

    let utxos = chain.deepest_utxo_set();
    println!();
    println!("{}", "Balances on the deepest branch:".bold());
    for (i, user) in world.users.iter().enumerate() {
        println!(
            "  User {}: {}",
            i,
            utxos.balance_of(&user.public_key).to_string().bright_cyan()
        );
    }

    Ok(())
}

/// Deepest block most of the time, otherwise a random tip.
fn choose_parent(world: &mut World, chain: &ChainTree, forks: u8) -> Hash {
    if world.rng.gen_range(0..100) < forks {
        if let Some(tip) = chain.tips().choose(&mut world.rng) {
            return *tip;
        }
    }
    chain.deepest_hash()
}

/// Queue one or two payments from outputs of the parent's ledger.
fn propose_payments(world: &mut World, chain: &mut ChainTree, utxos: &UnspentOutputSet) {
    let mut coins: Vec<OutputId> = utxos.iter().map(|(id, _)| *id).collect();
    coins.sort();
    coins.shuffle(&mut world.rng);

    let count = world.rng.gen_range(1..=2);
    for coin in coins.into_iter().take(count) {
        if let Some(tx) = world.payment(utxos, coin) {
            if let Some(evicted) = chain.add_transaction(tx) {
                debug!(tx = %evicted.hash().short(), "pending pool full, oldest payment dropped");
            }
        }
    }
}

/// What an honest miner includes: the pending transactions that land
/// together on top of the parent's ledger.
fn select_transactions(chain: &ChainTree, utxos: &UnspentOutputSet) -> Vec<Transaction> {
    let pending = chain.pending_pool().get_all();
    let mut scratch = utxos.clone();
    EpochProcessor::new()
        .handle_txs(&pending, &mut scratch)
        .map(|outcome| outcome.accepted)
        .unwrap_or_default()
}

/// Two payments spending the same output in one block.
fn double_spend(world: &mut World, utxos: &UnspentOutputSet) -> Vec<Transaction> {
    let mut coins: Vec<OutputId> = utxos
        .iter()
        .filter(|(_, output)| output.value > 0)
        .map(|(id, _)| *id)
        .collect();
    coins.sort();

    let coin = match coins.choose(&mut world.rng) {
        Some(coin) => *coin,
        None => return Vec::new(),
    };
    (0..2)
        .filter_map(|_| world.payment(utxos, coin))
        .collect()
}
