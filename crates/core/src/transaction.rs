//! UTXO transactions, their identity and the data each input signs.

use crate::crypto::{Keypair, PublicKey, Signature};
use crate::hash::{hash_encoded, Hash};
use crate::utxo::{Amount, Output, OutputId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("input index {index} out of range ({len} inputs)")]
    InputOutOfRange { index: usize, len: usize },
}

/// A claim on an unspent output together with the owner's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// The output being spent.
    pub prev: OutputId,
    /// Signature over [`Transaction::signed_data`] for this input.
    pub signature: Signature,
}

/// A transaction spending unspent outputs into new outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    /// Discriminator for otherwise identical transactions (coinbases).
    pub nonce: u64,
}

/// The part of a transaction that determines its identity.
#[derive(Serialize)]
struct UnsignedBody<'a> {
    inputs: Vec<&'a OutputId>,
    outputs: &'a [Output],
    nonce: u64,
}

/// What the signature of one input covers.
#[derive(Serialize)]
struct SignedInputData<'a> {
    input: &'a OutputId,
    outputs: &'a [Output],
    nonce: u64,
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            nonce: 0,
        }
    }

    /// Create a coinbase transaction minting `value` to `owner`.
    ///
    /// The nonce keeps coinbases of different blocks apart when they pay the
    /// same owner the same amount.
    pub fn coinbase(owner: PublicKey, value: Amount, nonce: u64) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: vec![Output::new(value, owner)],
            nonce,
        }
    }

    /// Append an unsigned input spending `prev`.
    pub fn add_input(&mut self, prev: OutputId) -> &mut Self {
        self.inputs.push(Input {
            prev,
            signature: Signature::default(),
        });
        self
    }

    /// Append an output.
    pub fn add_output(&mut self, value: Amount, owner: PublicKey) -> &mut Self {
        self.outputs.push(Output::new(value, owner));
        self
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Content hash over the input references, outputs and nonce.
    ///
    /// Signatures are excluded so that re-encoding a signature never changes
    /// the identity of a transaction.
    pub fn hash(&self) -> Hash {
        hash_encoded(&UnsignedBody {
            inputs: self.inputs.iter().map(|input| &input.prev).collect(),
            outputs: &self.outputs,
            nonce: self.nonce,
        })
    }

    /// The exact bytes the signature of input `index` must cover.
    pub fn signed_data(&self, index: usize) -> Result<Vec<u8>, TransactionError> {
        let input = self
            .inputs
            .get(index)
            .ok_or(TransactionError::InputOutOfRange {
                index,
                len: self.inputs.len(),
            })?;
        Ok(self.signing_message(&input.prev))
    }

    fn signing_message(&self, input: &OutputId) -> Vec<u8> {
        let data = SignedInputData {
            input,
            outputs: &self.outputs,
            nonce: self.nonce,
        };
        bincode::serialize(&data).expect("serialization should not fail")
    }

    /// Sign input `index` with `keypair`.
    pub fn sign_input(&mut self, index: usize, keypair: &Keypair) -> Result<(), TransactionError> {
        let message = self.signed_data(index)?;
        self.inputs[index].signature = keypair.sign(&message);
        Ok(())
    }

    /// Sign every input with the same keypair.
    pub fn signed(mut self, keypair: &Keypair) -> Self {
        let signatures: Vec<Signature> = self
            .inputs
            .iter()
            .map(|input| keypair.sign(&self.signing_message(&input.prev)))
            .collect();
        for (input, signature) in self.inputs.iter_mut().zip(signatures) {
            input.signature = signature;
        }
        self
    }

    /// The id under which output `index` of this transaction is recorded.
    pub fn output_id(&self, index: u32) -> OutputId {
        OutputId::new(self.hash(), index)
    }

    /// Check whether this transaction mints value without spending anything.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty() && self.outputs.len() == 1
    }

    /// Sum of output values, negative values included.
    pub fn output_sum(&self) -> i128 {
        self.outputs.iter().map(|o| o.value as i128).sum()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash;

    fn spend(prev: OutputId, to: PublicKey, value: Amount) -> Transaction {
        let mut tx = Transaction::new();
        tx.add_input(prev).add_output(value, to);
        tx
    }

    #[test]
    fn test_signature_does_not_change_hash() {
        let kp = Keypair::generate();
        let unsigned = spend(OutputId::new(hash(b"g"), 0), kp.public_key, 5);
        let signed = unsigned.clone().signed(&kp);

        assert_ne!(unsigned.inputs[0].signature, signed.inputs[0].signature);
        assert_eq!(unsigned.hash(), signed.hash());
    }

    #[test]
    fn test_hash_depends_on_outputs_and_inputs() {
        let kp = Keypair::generate();
        let a = spend(OutputId::new(hash(b"g"), 0), kp.public_key, 5);
        let b = spend(OutputId::new(hash(b"g"), 0), kp.public_key, 6);
        let c = spend(OutputId::new(hash(b"g"), 1), kp.public_key, 5);
        assert_ne!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
    }

    #[test]
    fn test_signed_data_per_input() {
        let kp = Keypair::generate();
        let mut tx = Transaction::new();
        tx.add_input(OutputId::new(hash(b"g"), 0))
            .add_input(OutputId::new(hash(b"g"), 1))
            .add_output(3, kp.public_key);

        let d0 = tx.signed_data(0).unwrap();
        let d1 = tx.signed_data(1).unwrap();
        assert_ne!(d0, d1);
        assert!(matches!(
            tx.signed_data(2),
            Err(TransactionError::InputOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_sign_input_verifies() {
        let kp = Keypair::generate();
        let mut tx = spend(OutputId::new(hash(b"g"), 0), kp.public_key, 5);
        tx.sign_input(0, &kp).unwrap();
        let message = tx.signed_data(0).unwrap();
        assert!(kp.public_key.verify(&message, &tx.inputs[0].signature).is_ok());
    }

    #[test]
    fn test_coinbase_nonce_distinguishes() {
        let kp = Keypair::generate();
        let cb1 = Transaction::coinbase(kp.public_key, 25, 1);
        let cb2 = Transaction::coinbase(kp.public_key, 25, 2);
        assert!(cb1.is_coinbase());
        assert_ne!(cb1.hash(), cb2.hash());
    }

    #[test]
    fn test_output_sum_includes_negatives() {
        let kp = Keypair::generate();
        let mut tx = Transaction::new();
        tx.add_output(5, kp.public_key).add_output(-2, kp.public_key);
        assert_eq!(tx.output_sum(), 3);
        assert_eq!(tx.output_id(1), OutputId::new(tx.hash(), 1));
    }
}
