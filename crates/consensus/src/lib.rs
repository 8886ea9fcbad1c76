//! Transaction acceptance rules for forkchain.
//!
//! This crate decides which transactions of a batch may land together:
//! - **Validation**: existence, signatures, intra-transaction double spends,
//!   output values and the balance rule against one UTXO snapshot
//! - **Conflict resolution**: per contested output, keep the highest-fee claimant
//! - **Dependency ordering**: producers before the transactions spending them
//!
//! # Example
//!
//! ```rust,no_run
//! use forkchain_consensus::{ConflictResolver, DependencyOrderer, TransactionValidator};
//! use forkchain_core::{Transaction, UnspentOutputSet};
//!
//! let utxos = UnspentOutputSet::new();
//! let batch: Vec<Transaction> = Vec::new();
//!
//! let validator = TransactionValidator::new();
//! let resolution = ConflictResolver::new(&validator).resolve(&batch, &utxos);
//! let order = DependencyOrderer::order(&resolution.candidates).unwrap();
//!
//! for tx in order {
//!     if validator.is_valid(tx, &utxos) {
//!         // apply tx
//!     }
//! }
//! ```

pub mod conflict;
pub mod ordering;
pub mod validator;

// Re-export commonly used types
pub use conflict::{group_conflicts, ConflictGroup, ConflictResolver, Resolution};
pub use ordering::{DependencyGraph, DependencyOrderer, OrderingError};
pub use validator::{Fee, TransactionValidator, TxError};
