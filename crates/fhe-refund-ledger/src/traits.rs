//! Ledger views: the abstract interface to the claims contract.
//!
//! The contract is reached through two views that fail independently: a
//! read-only [`ClaimReader`] and a signer-bound [`ClaimWriter`].

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use fhe_refund_core::{Address, BusinessKey, CiphertextHandle, ClaimRecord};

use crate::error::Result;
use crate::pending::PendingTransaction;

/// Arguments of the contract's `createClaim` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateClaimRequest {
    pub key: BusinessKey,
    pub name: String,
    /// Encrypted amount.
    pub handle: CiphertextHandle,
    /// Proof binding the handle to contract and signer.
    pub input_proof: Bytes,
    pub tax_rate_percent: u32,
    pub reserved_public_value: u64,
    pub label: String,
}

/// Read-only view of the claims contract.
///
/// Reads reflect the most recent confirmed transaction at call time.
#[async_trait]
pub trait ClaimReader: Send + Sync {
    /// Address of the contract behind this view.
    fn contract_address(&self) -> Address;

    /// List every claim key. Either the full set or an error, never partial.
    async fn list_claim_keys(&self) -> Result<Vec<BusinessKey>>;

    /// Fetch one claim record.
    async fn get_claim(&self, key: &BusinessKey) -> Result<ClaimRecord>;

    /// Fetch the handle of a claim's encrypted amount.
    async fn get_ciphertext_handle(&self, key: &BusinessKey) -> Result<CiphertextHandle>;
}

/// Signer-bound view of the claims contract.
#[async_trait]
pub trait ClaimWriter: Send + Sync {
    /// Address transactions are signed with.
    fn signer(&self) -> Address;

    /// Submit a `createClaim` transaction.
    async fn create_claim(&self, request: CreateClaimRequest) -> Result<PendingTransaction>;

    /// Submit a `verifyDecryption` transaction.
    ///
    /// Fails with [`AlreadyVerified`](crate::LedgerError::AlreadyVerified)
    /// when the claim is verified by the time the transaction executes.
    async fn submit_verify_decryption(
        &self,
        key: &BusinessKey,
        abi_encoded_clear_values: Bytes,
        proof: Bytes,
    ) -> Result<PendingTransaction>;
}

#[async_trait]
impl<R: ClaimReader + ?Sized> ClaimReader for Arc<R> {
    fn contract_address(&self) -> Address {
        (**self).contract_address()
    }

    async fn list_claim_keys(&self) -> Result<Vec<BusinessKey>> {
        (**self).list_claim_keys().await
    }

    async fn get_claim(&self, key: &BusinessKey) -> Result<ClaimRecord> {
        (**self).get_claim(key).await
    }

    async fn get_ciphertext_handle(&self, key: &BusinessKey) -> Result<CiphertextHandle> {
        (**self).get_ciphertext_handle(key).await
    }
}

#[async_trait]
impl<W: ClaimWriter + ?Sized> ClaimWriter for Arc<W> {
    fn signer(&self) -> Address {
        (**self).signer()
    }

    async fn create_claim(&self, request: CreateClaimRequest) -> Result<PendingTransaction> {
        (**self).create_claim(request).await
    }

    async fn submit_verify_decryption(
        &self,
        key: &BusinessKey,
        abi_encoded_clear_values: Bytes,
        proof: Bytes,
    ) -> Result<PendingTransaction> {
        (**self)
            .submit_verify_decryption(key, abi_encoded_clear_values, proof)
            .await
    }
}
