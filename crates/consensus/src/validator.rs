//! Transaction validation rules.
//!
//! A transaction is checked against one snapshot of unspent outputs. Checks
//! run per input in order (existence, signature, intra-transaction double
//! spend), then over outputs (non-negative values), then the balance rule.
//! The first failing check is reported.

use forkchain_core::{
    Amount, Ed25519Verifier, Input, Output, OutputId, SignatureVerifier, Transaction,
    UnspentOutputSet,
};
use std::collections::HashSet;
use thiserror::Error;

/// Input sum minus output sum. Wider than [`Amount`] so sums never overflow.
pub type Fee = i128;

/// Reasons a transaction is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("input {input:?} is not an unspent output")]
    MissingInput { input: OutputId },

    #[error("signature on input {index} does not verify")]
    BadSignature { index: usize },

    #[error("output {input:?} is claimed twice by the same transaction")]
    IntraTxDoubleSpend { input: OutputId },

    #[error("output {index} has negative value {value}")]
    NegativeOutput { index: usize, value: Amount },

    #[error("outputs ({outputs}) exceed inputs ({inputs})")]
    InsufficientFunds { inputs: Fee, outputs: Fee },
}

pub type Result<T> = std::result::Result<T, TxError>;

/// Transaction validator.
#[derive(Debug, Clone, Default)]
pub struct TransactionValidator<V = Ed25519Verifier> {
    verifier: V,
}

impl TransactionValidator<Ed25519Verifier> {
    /// Create a validator checking Ed25519 signatures.
    pub fn new() -> Self {
        Self {
            verifier: Ed25519Verifier,
        }
    }
}

impl<V: SignatureVerifier> TransactionValidator<V> {
    /// Create a validator using the given signature verifier.
    pub fn with_verifier(verifier: V) -> Self {
        Self { verifier }
    }

    /// Validate `tx` against `utxos`, returning its fee.
    ///
    /// Never mutates the snapshot.
    pub fn validate(&self, tx: &Transaction, utxos: &UnspentOutputSet) -> Result<Fee> {
        let mut claimed = HashSet::with_capacity(tx.inputs().len());
        let mut input_sum: Fee = 0;

        for (index, input) in tx.inputs().iter().enumerate() {
            let output = utxos
                .get(&input.prev)
                .ok_or(TxError::MissingInput { input: input.prev })?;

            if !self.input_signature_valid(tx, index, input, output) {
                return Err(TxError::BadSignature { index });
            }

            if !claimed.insert(input.prev) {
                return Err(TxError::IntraTxDoubleSpend { input: input.prev });
            }

            input_sum += output.value as Fee;
        }

        let mut output_sum: Fee = 0;
        for (index, output) in tx.outputs().iter().enumerate() {
            if output.value < 0 {
                return Err(TxError::NegativeOutput {
                    index,
                    value: output.value,
                });
            }
            output_sum += output.value as Fee;
        }

        if input_sum < output_sum {
            return Err(TxError::InsufficientFunds {
                inputs: input_sum,
                outputs: output_sum,
            });
        }

        Ok(input_sum - output_sum)
    }

    /// Boolean form of [`TransactionValidator::validate`].
    pub fn is_valid(&self, tx: &Transaction, utxos: &UnspentOutputSet) -> bool {
        self.validate(tx, utxos).is_ok()
    }

    /// Best-effort fee used to rank competing transactions.
    ///
    /// Unlike [`TransactionValidator::validate`] nothing short-circuits:
    /// missing inputs and inputs with bad signatures contribute nothing,
    /// negative outputs are skipped, and repeated inputs are not detected.
    /// A transaction can therefore rank well here and still be refused later.
    pub fn estimate_fee(&self, tx: &Transaction, utxos: &UnspentOutputSet) -> Fee {
        let input_sum: Fee = tx
            .inputs()
            .iter()
            .enumerate()
            .filter_map(|(index, input)| {
                let output = utxos.get(&input.prev)?;
                self.input_signature_valid(tx, index, input, output)
                    .then_some(output.value as Fee)
            })
            .sum();

        let output_sum: Fee = tx
            .outputs()
            .iter()
            .filter(|output| output.value >= 0)
            .map(|output| output.value as Fee)
            .sum();

        input_sum - output_sum
    }

    fn input_signature_valid(
        &self,
        tx: &Transaction,
        index: usize,
        input: &Input,
        output: &Output,
    ) -> bool {
        tx.signed_data(index)
            .map(|message| self.verifier.verify(&output.owner, &message, &input.signature))
            .unwrap_or(false)
    }
}
