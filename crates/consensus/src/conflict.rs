//! Conflict resolution between transactions competing for the same output.
//!
//! Transactions of a batch are grouped by every output they claim. Each group
//! keeps the transaction with the highest estimated fee; the first maximum in
//! batch order wins ties. Grouping is per output, not transitive: a
//! transaction may win one group while losing another, in which case it stays
//! a candidate and later validation decides between it and the other winner.

use crate::validator::{Fee, TransactionValidator};
use forkchain_core::{Hash, OutputId, SignatureVerifier, Transaction, UnspentOutputSet};
use std::collections::{HashMap, HashSet};

/// Transactions of one batch that claim the same output.
#[derive(Debug, Clone)]
pub struct ConflictGroup<'a> {
    /// The contested output.
    pub output: OutputId,
    /// Claimants in batch order.
    pub members: Vec<&'a Transaction>,
}

/// Outcome of conflict resolution over a batch.
#[derive(Debug, Clone, Default)]
pub struct Resolution<'a> {
    /// Surviving transactions, each at most once, in batch order.
    pub candidates: Vec<&'a Transaction>,
    /// Transactions that won no group they took part in.
    pub losers: Vec<&'a Transaction>,
    /// Repeated copies of a transaction already present in the batch.
    pub duplicates: Vec<&'a Transaction>,
}

/// Selects, per contested output, the claimant paying the highest fee.
pub struct ConflictResolver<'v, V> {
    validator: &'v TransactionValidator<V>,
}

/// Group `batch` by claimed output, in order of first claim.
///
/// A transaction appears once in every group for an output it claims, even
/// if it claims that output through several inputs.
pub fn group_conflicts(batch: &[Transaction]) -> Vec<ConflictGroup<'_>> {
    indexed_groups(batch)
        .into_iter()
        .map(|(output, members)| ConflictGroup {
            output,
            members: members.into_iter().map(|i| &batch[i]).collect(),
        })
        .collect()
}

fn indexed_groups(batch: &[Transaction]) -> Vec<(OutputId, Vec<usize>)> {
    let mut groups: Vec<(OutputId, Vec<usize>)> = Vec::new();
    let mut by_output: HashMap<OutputId, usize> = HashMap::new();

    for (tx_index, tx) in batch.iter().enumerate() {
        for input in tx.inputs() {
            let slot = *by_output.entry(input.prev).or_insert_with(|| {
                groups.push((input.prev, Vec::new()));
                groups.len() - 1
            });
            let members = &mut groups[slot].1;
            if members.last() != Some(&tx_index) {
                members.push(tx_index);
            }
        }
    }

    groups
}

impl<'v, V: SignatureVerifier> ConflictResolver<'v, V> {
    /// Create a resolver ranking by the validator's fee estimate.
    pub fn new(validator: &'v TransactionValidator<V>) -> Self {
        Self { validator }
    }

    /// Index of the member with the highest estimated fee, first seen on ties.
    fn best_by_fee(
        &self,
        batch: &[Transaction],
        members: &[usize],
        utxos: &UnspentOutputSet,
    ) -> Option<usize> {
        let mut best: Option<(usize, Fee)> = None;
        for &index in members {
            let fee = self.validator.estimate_fee(&batch[index], utxos);
            match best {
                Some((_, best_fee)) if fee <= best_fee => {}
                _ => best = Some((index, fee)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Resolve conflicts within `batch` against the outputs in `utxos`.
    ///
    /// Transactions without inputs claim nothing and always survive.
    pub fn resolve<'a>(&self, batch: &'a [Transaction], utxos: &UnspentOutputSet) -> Resolution<'a> {
        let mut won = vec![false; batch.len()];
        for (_, members) in indexed_groups(batch) {
            let winner = if members.len() == 1 {
                Some(members[0])
            } else {
                self.best_by_fee(batch, &members, utxos)
            };
            if let Some(index) = winner {
                won[index] = true;
            }
        }

        let mut resolution = Resolution::default();
        let mut seen: HashSet<Hash> = HashSet::new();
        for (tx, won) in batch.iter().zip(won) {
            if !(won || tx.inputs().is_empty()) {
                resolution.losers.push(tx);
            } else if seen.insert(tx.hash()) {
                resolution.candidates.push(tx);
            } else {
                resolution.duplicates.push(tx);
            }
        }

        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkchain_core::{hash, Amount, Keypair, Output};

    fn setup() -> (Keypair, UnspentOutputSet, OutputId, OutputId) {
        let alice = Keypair::generate();
        let a = OutputId::new(hash(b"genesis"), 0);
        let b = OutputId::new(hash(b"genesis"), 1);
        let mut utxos = UnspentOutputSet::new();
        utxos.insert(a, Output::new(10, alice.public_key));
        utxos.insert(b, Output::new(10, alice.public_key));
        (alice, utxos, a, b)
    }

    fn spend(owner: &Keypair, inputs: &[OutputId], outputs: &[Amount]) -> Transaction {
        let mut tx = Transaction::new();
        for input in inputs {
            tx.add_input(*input);
        }
        for value in outputs {
            tx.add_output(*value, owner.public_key);
        }
        tx.signed(owner)
    }

    #[test]
    fn test_groups_by_claimed_output() {
        let (alice, _, a, b) = setup();
        let t1 = spend(&alice, &[a], &[9]);
        let t2 = spend(&alice, &[a, b], &[18]);
        let t3 = spend(&alice, &[b], &[1]);
        let batch = vec![t1, t2, t3];

        let groups = group_conflicts(&batch);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].output, a);
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[1].output, b);
        assert_eq!(groups[1].members.len(), 2);
    }

    #[test]
    fn test_highest_fee_wins() {
        let (alice, utxos, a, _) = setup();
        let low = spend(&alice, &[a], &[9]);
        let high = spend(&alice, &[a], &[4, 4]);
        let batch = vec![low.clone(), high.clone()];

        let validator = TransactionValidator::new();
        let resolution = ConflictResolver::new(&validator).resolve(&batch, &utxos);
        assert_eq!(resolution.candidates, vec![&high]);
        assert_eq!(resolution.losers, vec![&low]);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let (alice, utxos, a, _) = setup();
        let first = spend(&alice, &[a], &[7]);
        let second = spend(&alice, &[a], &[3, 4]);
        let batch = vec![first.clone(), second];

        let validator = TransactionValidator::new();
        let resolution = ConflictResolver::new(&validator).resolve(&batch, &utxos);
        assert_eq!(resolution.candidates, vec![&first]);
    }

    #[test]
    fn test_bad_signature_ranks_low() {
        let (alice, utxos, a, _) = setup();
        let mallory = Keypair::generate();
        let forged = spend(&mallory, &[a], &[1]);
        let honest = spend(&alice, &[a], &[9]);
        let batch = vec![forged, honest.clone()];

        let validator = TransactionValidator::new();
        let resolution = ConflictResolver::new(&validator).resolve(&batch, &utxos);
        assert_eq!(resolution.candidates, vec![&honest]);
    }

    #[test]
    fn test_uncontested_and_inputless_pass_through() {
        let (alice, utxos, a, b) = setup();
        let t1 = spend(&alice, &[a], &[10]);
        let t2 = spend(&alice, &[b], &[10]);
        let empty = Transaction::new();
        let batch = vec![t1.clone(), empty.clone(), t2.clone()];

        let validator = TransactionValidator::new();
        let resolution = ConflictResolver::new(&validator).resolve(&batch, &utxos);
        assert_eq!(resolution.candidates, vec![&t1, &empty, &t2]);
        assert!(resolution.losers.is_empty());
    }

    #[test]
    fn test_multi_group_winner_listed_once() {
        let (alice, utxos, a, b) = setup();
        let both = spend(&alice, &[a, b], &[15]);
        let only_a = spend(&alice, &[a], &[9]);
        let batch = vec![both.clone(), only_a.clone()];

        let validator = TransactionValidator::new();
        let resolution = ConflictResolver::new(&validator).resolve(&batch, &utxos);
        assert_eq!(resolution.candidates, vec![&both]);
        assert_eq!(resolution.losers, vec![&only_a]);
    }

    #[test]
    fn test_identical_copies_deduplicated() {
        let (alice, utxos, a, _) = setup();
        let tx = spend(&alice, &[a], &[9]);
        let batch = vec![tx.clone(), tx.clone()];

        let validator = TransactionValidator::new();
        let resolution = ConflictResolver::new(&validator).resolve(&batch, &utxos);
        assert_eq!(resolution.candidates, vec![&batch[0]]);
        assert_eq!(resolution.losers, vec![&batch[1]]);
    }

    #[test]
    fn test_identical_inputless_copies_reported_as_duplicates() {
        let batch = vec![Transaction::new(), Transaction::new()];
        let validator = TransactionValidator::new();
        let resolution = ConflictResolver::new(&validator).resolve(&batch, &UnspentOutputSet::new());
        assert_eq!(resolution.candidates.len(), 1);
        assert_eq!(resolution.duplicates.len(), 1);
    }
}
