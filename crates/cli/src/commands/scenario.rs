//! Guided walk through the two reference scenarios.

use super::{print_utxos, short};
use anyhow::{Context, Result};
use colored::Colorize;
use forkchain_chain::{ChainConfig, ChainTree, EpochProcessor};
use forkchain_consensus::TransactionValidator;
use forkchain_core::{Block, Keypair, Transaction};

pub fn run() -> Result<()> {
    max_fee()?;
    println!();
    cutoff_age()
}

fn max_fee() -> Result<()> {
    println!("{}", "Max-fee conflict resolution".bold().cyan());
    println!();

    let alice = Keypair::generate();
    let genesis = Block::genesis(alice.public_key, 10);
    let chain = ChainTree::new(genesis.clone());
    let mut utxos = (*chain.deepest_utxo_set()).clone();
    let coin = genesis.coinbase().output_id(0);

    println!("  Genesis ledger:");
    print_utxos(&utxos);

    let mut a = Transaction::new();
    a.add_input(coin)
        .add_output(4, alice.public_key)
        .add_output(4, alice.public_key);
    let a = a.signed(&alice);

    let mut b = Transaction::new();
    b.add_input(coin).add_output(9, alice.public_key);
    let b = b.signed(&alice);

    let validator = TransactionValidator::new();
    for (name, tx) in [("A", &a), ("B", &b)] {
        println!(
            "  Tx {} {} spends {}:0 with fee {}",
            name,
            short(&tx.hash()),
            short(&coin.tx_hash),
            validator.estimate_fee(tx, &utxos).to_string().bright_cyan()
        );
    }

    let outcome = EpochProcessor::new()
        .handle_txs(&[a, b], &mut utxos)
        .context("epoch failed")?;

    println!();
    for tx in &outcome.accepted {
        println!("{}  accepted {}", "✓".green().bold(), short(&tx.hash()));
    }
    for rejected in &outcome.rejected {
        println!(
            "{}  rejected {}: {}",
            "✗".red().bold(),
            short(&rejected.tx_hash),
            rejected.reason.to_string().bright_black()
        );
    }
    println!("  Fees collected: {}", outcome.total_fees.to_string().bright_cyan());
    println!("  Ledger after the epoch:");
    print_utxos(&utxos);

    Ok(())
}

fn cutoff_age() -> Result<()> {
    let config = ChainConfig {
        cutoff_age: 3,
        prune: false,
        ..ChainConfig::default()
    };
    println!(
        "{}",
        format!("Fork cutoff (cutoff age {})", config.cutoff_age)
            .bold()
            .cyan()
    );
    println!();

    let miner = Keypair::generate();
    let genesis = Block::genesis(miner.public_key, 25);
    let mut chain = ChainTree::with_config(genesis.clone(), config);

    let mut prev = genesis.hash();
    for _ in 0..5 {
        prev = chain.add_block(Block::new(prev, miner.public_key))?;
        println!(
            "{}  extended to height {} with {}",
            "✓".green().bold(),
            chain.deepest_height(),
            short(&prev)
        );
    }

    let rival = Keypair::generate();
    match chain.add_block(Block::new(genesis.hash(), rival.public_key)) {
        Ok(hash) => println!("{}  late fork {} accepted", "✓".green().bold(), short(&hash)),
        Err(err) => println!(
            "{}  late fork on genesis rejected: {}",
            "✗".red().bold(),
            err.to_string().bright_black()
        ),
    }
    println!(
        "  Deepest height is still {}",
        chain.deepest_height().to_string().bright_cyan()
    );

    Ok(())
}
