//! The encryption gateway: an opaque encrypt / prove-decryption capability.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use fhe_refund_core::{Address, CiphertextHandle};

use crate::error::Result;

/// An encrypted input ready to be submitted to the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    /// Handle the contract will store.
    pub handle: CiphertextHandle,
    /// Proof binding the handle to the contract and owner.
    pub proof: Bytes,
}

/// Cleartexts plus the evidence the contract needs to accept them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionProof {
    pub clear_values: BTreeMap<CiphertextHandle, u64>,
    /// Clear values as ABI words, in request order.
    pub abi_encoded_clear_values: Bytes,
    pub proof: Bytes,
}

impl DecryptionProof {
    pub fn clear_value(&self, handle: &CiphertextHandle) -> Option<u64> {
        self.clear_values.get(handle).copied()
    }
}

/// Encryption capability bound to the connected session.
///
/// Decryption is two-phase: [`request_decryption_proof`] only produces the
/// proof. Submitting it to the ledger is the caller's job.
///
/// [`request_decryption_proof`]: EncryptionGateway::request_decryption_proof
#[async_trait]
pub trait EncryptionGateway: Send + Sync {
    /// Prepare the capability for use. Idempotent.
    async fn initialize(&self) -> Result<()>;

    fn is_ready(&self) -> bool;

    /// Encrypt `plaintext` for `contract`, owned by `owner`.
    async fn encrypt(
        &self,
        contract: &Address,
        owner: &Address,
        plaintext: u64,
    ) -> Result<EncryptedInput>;

    /// Decrypt `handles` and prove the result for on-chain verification.
    async fn request_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        contract: &Address,
        requester: &Address,
    ) -> Result<DecryptionProof>;

    /// Decrypt one handle for its owner only, without any proof.
    ///
    /// The result is not verifiable by the ledger.
    async fn user_decrypt(
        &self,
        handle: &CiphertextHandle,
        contract: &Address,
        requester: &Address,
    ) -> Result<u64>;
}

#[async_trait]
impl<G: EncryptionGateway + ?Sized> EncryptionGateway for Arc<G> {
    async fn initialize(&self) -> Result<()> {
        (**self).initialize().await
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    async fn encrypt(
        &self,
        contract: &Address,
        owner: &Address,
        plaintext: u64,
    ) -> Result<EncryptedInput> {
        (**self).encrypt(contract, owner, plaintext).await
    }

    async fn request_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        contract: &Address,
        requester: &Address,
    ) -> Result<DecryptionProof> {
        (**self)
            .request_decryption_proof(handles, contract, requester)
            .await
    }

    async fn user_decrypt(
        &self,
        handle: &CiphertextHandle,
        contract: &Address,
        requester: &Address,
    ) -> Result<u64> {
        (**self).user_decrypt(handle, contract, requester).await
    }
}
