//! Unspent transaction outputs and the set that tracks them.

use crate::crypto::PublicKey;
use crate::hash::Hash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Monetary amount. Signed so that malformed negative outputs can be represented
/// and rejected by validation instead of being unrepresentable.
pub type Amount = i64;

/// Reference to one output of one transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputId {
    /// Hash of the transaction that produced the output.
    pub tx_hash: Hash,
    /// Position of the output in that transaction.
    pub index: u32,
}

impl OutputId {
    pub fn new(tx_hash: Hash, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({}:{})", self.tx_hash.short(), self.index)
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash.to_hex(), self.index)
    }
}

/// A transaction output: a value locked to an owner key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub value: Amount,
    pub owner: PublicKey,
}

impl Output {
    pub fn new(value: Amount, owner: PublicKey) -> Self {
        Self { value, owner }
    }
}

/// The outputs spendable at one point of chain history.
///
/// Cloning yields an independent snapshot; the chain clones a parent's set
/// before applying any transaction of a child block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutputSet {
    outputs: HashMap<OutputId, Output>,
}

impl UnspentOutputSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an output is unspent.
    pub fn contains(&self, id: &OutputId) -> bool {
        self.outputs.contains_key(id)
    }

    /// Get an unspent output by id.
    pub fn get(&self, id: &OutputId) -> Option<&Output> {
        self.outputs.get(id)
    }

    /// Insert an output, replacing any previous entry under the same id.
    pub fn insert(&mut self, id: OutputId, output: Output) {
        self.outputs.insert(id, output);
    }

    /// Remove an output, returning it if it was unspent.
    pub fn remove(&mut self, id: &OutputId) -> Option<Output> {
        self.outputs.remove(id)
    }

    /// Get the number of unspent outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutputId, &Output)> {
        self.outputs.iter()
    }

    /// Sum of all unspent values.
    pub fn total_value(&self) -> i128 {
        self.outputs.values().map(|o| o.value as i128).sum()
    }

    /// Ids of every output locked to `owner`, sorted for stable iteration.
    pub fn outputs_owned_by(&self, owner: &PublicKey) -> Vec<OutputId> {
        let mut ids: Vec<OutputId> = self
            .outputs
            .iter()
            .filter(|(_, out)| &out.owner == owner)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Total value spendable by `owner`.
    pub fn balance_of(&self, owner: &PublicKey) -> i128 {
        self.outputs
            .values()
            .filter(|out| &out.owner == owner)
            .map(|out| out.value as i128)
            .sum()
    }
}
