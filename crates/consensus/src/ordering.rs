//! Producer-before-consumer ordering of a candidate set.
//!
//! An edge P -> C exists when C spends an output of P and both are in the
//! set. The order is the reversed post-order of a depth-first traversal that
//! visits roots and neighbors in candidate order. The traversal keeps an
//! explicit stack so batch size is not limited by recursion depth.

use forkchain_core::{Hash, Transaction};
use std::collections::HashMap;
use thiserror::Error;

/// Integrity failures found while ordering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    /// Transactions spending each other's outputs. Fatal for the batch.
    #[error("dependency cycle through transaction {tx_hash:?}")]
    Cycle { tx_hash: Hash },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Producer -> consumer graph over a candidate set.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    hashes: Vec<Hash>,
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph. Node `i` is `candidates[i]`.
    pub fn build(candidates: &[&Transaction]) -> Self {
        let hashes: Vec<Hash> = candidates.iter().map(|tx| tx.hash()).collect();
        let index: HashMap<Hash, usize> = hashes
            .iter()
            .enumerate()
            .map(|(i, h)| (*h, i))
            .collect();

        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); candidates.len()];
        for (consumer, tx) in candidates.iter().enumerate() {
            for input in tx.inputs() {
                if let Some(&producer) = index.get(&input.prev.tx_hash) {
                    if !edges[producer].contains(&consumer) {
                        edges[producer].push(consumer);
                    }
                }
            }
        }

        Self { hashes, edges }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Consumers of node `producer`, in candidate order.
    pub fn consumers(&self, producer: usize) -> &[usize] {
        &self.edges[producer]
    }

    /// Node indices in topological order.
    pub fn topological_order(&self) -> Result<Vec<usize>, OrderingError> {
        let n = self.len();
        let mut marks = vec![Mark::Unvisited; n];
        let mut post_order = Vec::with_capacity(n);
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::InProgress;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                match self.edges[node].get(frame.1).copied() {
                    Some(child) => {
                        frame.1 += 1;
                        match marks[child] {
                            Mark::Unvisited => {
                                marks[child] = Mark::InProgress;
                                stack.push((child, 0));
                            }
                            Mark::InProgress => {
                                return Err(OrderingError::Cycle {
                                    tx_hash: self.hashes[child],
                                })
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[node] = Mark::Done;
                        post_order.push(node);
                        stack.pop();
                    }
                }
            }
        }

        post_order.reverse();
        Ok(post_order)
    }
}

/// Orders candidate transactions so producers precede their consumers.
pub struct DependencyOrderer;

impl DependencyOrderer {
    /// Return `candidates` in processing order.
    pub fn order<'a>(candidates: &[&'a Transaction]) -> Result<Vec<&'a Transaction>, OrderingError> {
        let order = DependencyGraph::build(candidates).topological_order()?;
        Ok(order.into_iter().map(|i| candidates[i]).collect())
    }
}
