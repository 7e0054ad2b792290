//! Fault injection for ledger reads, and gates that hold a flow mid-way.
//!
//! A gate is a shared [`Notify`]: each gated step waits for one
//! `notify_one` before proceeding, so a test can observe the coordinator
//! while a step is parked.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use fhe_refund_core::{Address, BusinessKey, CiphertextHandle, ClaimRecord};
use fhe_refund_gateway::{DecryptionProof, EncryptedInput, EncryptionGateway};
use fhe_refund_ledger::{
    ClaimReader, ClaimWriter, CreateClaimRequest, LedgerError, PendingTransaction, Result,
};
use tokio::sync::Notify;

/// A [`ClaimReader`] that fails or lags on demand.
///
/// - Keys marked with [`fail_key`](Self::fail_key) fail `get_claim`.
/// - [`fail_listing`](Self::fail_listing) makes `list_claim_keys` fail.
/// - [`stale_reads`](Self::stale_reads) makes the next `n` `get_claim`
///   calls report the claim as unverified, as a lagging node would.
pub struct FaultyReader<R> {
    inner: R,
    failing_keys: Mutex<HashSet<BusinessKey>>,
    failing_listing: AtomicBool,
    stale_remaining: AtomicUsize,
}

impl<R: ClaimReader> FaultyReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            failing_keys: Mutex::new(HashSet::new()),
            failing_listing: AtomicBool::new(false),
            stale_remaining: AtomicUsize::new(0),
        }
    }

    pub fn fail_key(&self, key: &BusinessKey) {
        self.failing_keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
    }

    pub fn fail_listing(&self, fail: bool) {
        self.failing_listing.store(fail, Ordering::SeqCst);
    }

    pub fn stale_reads(&self, count: usize) {
        self.stale_remaining.store(count, Ordering::SeqCst);
    }

    fn take_stale(&self) -> bool {
        self.stale_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl<R: ClaimReader> ClaimReader for FaultyReader<R> {
    fn contract_address(&self) -> Address {
        self.inner.contract_address()
    }

    async fn list_claim_keys(&self) -> Result<Vec<BusinessKey>> {
        if self.failing_listing.load(Ordering::SeqCst) {
            return Err(LedgerError::ReadFailure("injected listing failure".into()));
        }
        self.inner.list_claim_keys().await
    }

    async fn get_claim(&self, key: &BusinessKey) -> Result<ClaimRecord> {
        let failing = self
            .failing_keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key);
        if failing {
            return Err(LedgerError::ReadFailure(format!("injected read failure for {key}")));
        }

        let mut record = self.inner.get_claim(key).await?;
        if self.take_stale() {
            record.is_verified = false;
            record.decrypted_value = None;
        }
        Ok(record)
    }

    async fn get_ciphertext_handle(&self, key: &BusinessKey) -> Result<CiphertextHandle> {
        self.inner.get_ciphertext_handle(key).await
    }
}

/// A [`ClaimWriter`] whose transactions wait on `gate` before inclusion.
///
/// Submission itself is immediate; only [`PendingTransaction::wait`]
/// parks.
pub struct GatedWriter<W> {
    inner: W,
    gate: Arc<Notify>,
}

impl<W: ClaimWriter> GatedWriter<W> {
    pub fn new(inner: W, gate: Arc<Notify>) -> Self {
        Self { inner, gate }
    }

    fn hold(&self, pending: PendingTransaction) -> PendingTransaction {
        let gate = Arc::clone(&self.gate);
        let tx_hash = pending.tx_hash();
        PendingTransaction::new(tx_hash, async move {
            gate.notified().await;
            pending.wait().await
        })
    }
}

#[async_trait]
impl<W: ClaimWriter> ClaimWriter for GatedWriter<W> {
    fn signer(&self) -> Address {
        self.inner.signer()
    }

    async fn create_claim(&self, request: CreateClaimRequest) -> Result<PendingTransaction> {
        let pending = self.inner.create_claim(request).await?;
        Ok(self.hold(pending))
    }

    async fn submit_verify_decryption(
        &self,
        key: &BusinessKey,
        abi_encoded_clear_values: Bytes,
        proof: Bytes,
    ) -> Result<PendingTransaction> {
        let pending = self
            .inner
            .submit_verify_decryption(key, abi_encoded_clear_values, proof)
            .await?;
        Ok(self.hold(pending))
    }
}

/// An [`EncryptionGateway`] whose `encrypt` waits on `gate`.
pub struct GatedGateway<G> {
    inner: G,
    gate: Arc<Notify>,
}

impl<G: EncryptionGateway> GatedGateway<G> {
    pub fn new(inner: G, gate: Arc<Notify>) -> Self {
        Self { inner, gate }
    }
}

#[async_trait]
impl<G: EncryptionGateway> EncryptionGateway for GatedGateway<G> {
    async fn initialize(&self) -> fhe_refund_gateway::Result<()> {
        self.inner.initialize().await
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    async fn encrypt(
        &self,
        contract: &Address,
        owner: &Address,
        plaintext: u64,
    ) -> fhe_refund_gateway::Result<EncryptedInput> {
        self.gate.notified().await;
        self.inner.encrypt(contract, owner, plaintext).await
    }

    async fn request_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        contract: &Address,
        requester: &Address,
    ) -> fhe_refund_gateway::Result<DecryptionProof> {
        self.inner
            .request_decryption_proof(handles, contract, requester)
            .await
    }

    async fn user_decrypt(
        &self,
        handle: &CiphertextHandle,
        contract: &Address,
        requester: &Address,
    ) -> fhe_refund_gateway::Result<u64> {
        self.inner.user_decrypt(handle, contract, requester).await
    }
}
