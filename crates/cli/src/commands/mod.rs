//! CLI commands module.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use forkchain_core::{Hash, UnspentOutputSet};

mod scenario;
mod simulate;

#[derive(Subcommand)]
pub enum Commands {
    /// Grow a chain with random forks and double-spend attempts
    Simulate(simulate::SimulateArgs),
    /// Walk through the max-fee and cutoff-age scenarios
    Scenario,
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Simulate(args) => simulate::run(args),
        Commands::Scenario => scenario::run(),
    }
}

/// Short coloured block or transaction id.
fn short(hash: &Hash) -> String {
    hash.short().bright_yellow().to_string()
}

/// Print every unspent output, sorted by id.
fn print_utxos(utxos: &UnspentOutputSet) {
    let mut entries: Vec<_> = utxos.iter().collect();
    entries.sort_by_key(|(id, _)| **id);
    for (id, output) in entries {
        println!(
            "    {}:{} = {}",
            short(&id.tx_hash),
            id.index,
            output.value.to_string().bright_cyan()
        );
    }
}
