//! Core ledger primitives for forkchain.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - Blake3 hashing
//! - Ed25519 keys, signatures and the [`SignatureVerifier`] seam
//! - Unspent outputs and the [`UnspentOutputSet`]
//! - Transactions
//! - Blocks

pub mod block;
pub mod crypto;
pub mod hash;
pub mod transaction;
pub mod utxo;

// Re-export commonly used types at the crate root
pub use block::{Block, COINBASE_REWARD};
pub use crypto::{CryptoError, Ed25519Verifier, Keypair, PublicKey, Signature, SignatureVerifier};
pub use hash::{hash, hash_encoded, Hash};
pub use transaction::{Input, Transaction, TransactionError};
pub use utxo::{Amount, Output, OutputId, UnspentOutputSet};
