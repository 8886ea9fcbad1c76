//! In-memory ledger checkpoints.

use forkchain_core::{Hash, UnspentOutputSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, CheckpointError>;

/// The ledger after a given block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub height: u64,
    pub block_hash: Hash,
    pub utxos: UnspentOutputSet,
}

impl Checkpoint {
    pub fn new(height: u64, block_hash: Hash, utxos: UnspentOutputSet) -> Self {
        Self {
            height,
            block_hash,
            utxos,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
