//! forkchain CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "forkchain")]
#[command(about = "A UTXO ledger with max-fee conflict resolution and bounded forks", long_about = None)]
struct Cli {
    /// Log every rejected transaction and pruning pass
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<commands::Commands>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => {
            if let Err(e) = commands::run(cmd) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("forkchain - A UTXO ledger with bounded forks");
            println!("Run 'forkchain --help' for usage information.");
        }
    }
}
