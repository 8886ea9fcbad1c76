//! Epoch processing.
//!
//! Turns an unordered batch of transactions into a mutually consistent
//! accepted subset and applies it to a UTXO set.

use forkchain_consensus::{
    ConflictResolver, DependencyOrderer, Fee, OrderingError, TransactionValidator, TxError,
};
use forkchain_core::{
    Ed25519Verifier, Hash, OutputId, SignatureVerifier, Transaction, UnspentOutputSet,
};
use thiserror::Error;
use tracing::debug;

/// Why a transaction of an epoch was left out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("lost every conflict it took part in")]
    ConflictLost,

    #[error("duplicate of an earlier transaction in the batch")]
    Duplicate,

    #[error("invalid: {0}")]
    Invalid(#[from] TxError),
}

/// A transaction left out of an epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTransaction {
    /// Transaction hash.
    pub tx_hash: Hash,
    /// Why it was left out.
    pub reason: RejectReason,
}

/// Result of processing one epoch.
#[derive(Debug, Clone, Default)]
pub struct EpochOutcome {
    /// Accepted transactions in application order.
    pub accepted: Vec<Transaction>,
    /// Transactions left out.
    pub rejected: Vec<RejectedTransaction>,
    /// Fees collected from the accepted transactions.
    pub total_fees: Fee,
}

impl EpochOutcome {
    /// Check whether every one of `submitted` transactions was accepted.
    pub fn accepted_all(&self, submitted: usize) -> bool {
        self.accepted.len() == submitted
    }
}

/// Epoch processor.
#[derive(Debug, Clone, Default)]
pub struct EpochProcessor<V = Ed25519Verifier> {
    validator: TransactionValidator<V>,
}

impl EpochProcessor<Ed25519Verifier> {
    /// Create a processor checking Ed25519 signatures.
    pub fn new() -> Self {
        Self {
            validator: TransactionValidator::new(),
        }
    }
}

impl<V: SignatureVerifier> EpochProcessor<V> {
    /// Create a processor with a custom signature verifier.
    pub fn with_verifier(verifier: V) -> Self {
        Self {
            validator: TransactionValidator::with_verifier(verifier),
        }
    }

    /// Process one epoch.
    ///
    /// Conflicts are resolved first, survivors are ordered producers first,
    /// then each is validated against the state left by the ones before it.
    /// Invalid transactions are skipped without touching `utxos`; accepted
    /// transactions are never rolled back. On return `utxos` reflects exactly
    /// `accepted`.
    ///
    /// The only error is a dependency cycle, which means corrupted input and
    /// leaves `utxos` untouched.
    pub fn handle_txs(
        &self,
        batch: &[Transaction],
        utxos: &mut UnspentOutputSet,
    ) -> Result<EpochOutcome, OrderingError> {
        let resolution = ConflictResolver::new(&self.validator).resolve(batch, utxos);
        let order = DependencyOrderer::order(&resolution.candidates)?;

        let mut outcome = EpochOutcome::default();
        for tx in resolution.losers {
            outcome.rejected.push(Self::rejected(tx, RejectReason::ConflictLost));
        }
        for tx in resolution.duplicates {
            outcome.rejected.push(Self::rejected(tx, RejectReason::Duplicate));
        }

        self.settle(order, utxos, &mut outcome);
        Ok(outcome)
    }

    /// Process one epoch in submitted order.
    ///
    /// No conflict ranking and no reordering: each transaction is validated
    /// against the state left by the ones submitted before it. A consumer
    /// submitted ahead of its producer is rejected, and of two claimants of
    /// one output the first valid one lands.
    pub fn handle_txs_in_order(
        &self,
        batch: &[Transaction],
        utxos: &mut UnspentOutputSet,
    ) -> EpochOutcome {
        let mut outcome = EpochOutcome::default();
        self.settle(batch, utxos, &mut outcome);
        outcome
    }

    /// Validate each transaction in turn, applying the valid ones.
    fn settle<'a>(
        &self,
        txs: impl IntoIterator<Item = &'a Transaction>,
        utxos: &mut UnspentOutputSet,
        outcome: &mut EpochOutcome,
    ) {
        for tx in txs {
            match self.validator.validate(tx, utxos) {
                Ok(fee) => {
                    Self::apply(tx, utxos);
                    outcome.total_fees += fee;
                    outcome.accepted.push(tx.clone());
                }
                Err(err) => outcome.rejected.push(Self::rejected(tx, err.into())),
            }
        }
    }

    /// Remove the outputs `tx` consumes and insert the ones it produces.
    fn apply(tx: &Transaction, utxos: &mut UnspentOutputSet) {
        for input in tx.inputs() {
            utxos.remove(&input.prev);
        }
        let tx_hash = tx.hash();
        for (index, output) in tx.outputs().iter().enumerate() {
            utxos.insert(OutputId::new(tx_hash, index as u32), *output);
        }
    }

    fn rejected(tx: &Transaction, reason: RejectReason) -> RejectedTransaction {
        let tx_hash = tx.hash();
        debug!(tx = %tx_hash.short(), %reason, "transaction left out of epoch");
        RejectedTransaction { tx_hash, reason }
    }
}
