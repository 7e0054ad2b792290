//! Proof verification seam between a ledger and the encryption capability.

use crate::types::{Address, CiphertextHandle};

/// Checks the proofs a ledger receives alongside encrypted inputs and
/// decryption results.
///
/// A real deployment verifies these on-chain against the scheme's key
/// material; in-memory ledgers delegate to whichever capability produced
/// the proofs.
pub trait ProofVerifier: Send + Sync {
    /// Check that `proof` binds `handle` to `contract` and `owner`.
    fn verify_input_proof(
        &self,
        contract: &Address,
        owner: &Address,
        handle: &CiphertextHandle,
        proof: &[u8],
    ) -> bool;

    /// Check that `proof` attests `abi_encoded_clear_values` are the
    /// decryptions of `handles`, in order.
    fn verify_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        abi_encoded_clear_values: &[u8],
        proof: &[u8],
    ) -> bool;
}
