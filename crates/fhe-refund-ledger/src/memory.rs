//! In-memory implementation of the claims contract.
//!
//! Behaves like the deployed contract from a client's point of view:
//! transactions execute when their inclusion is awaited, claims are
//! append-only, and a claim can be verified exactly once. Proofs are checked
//! through a [`ProofVerifier`] supplied by whoever produces them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use fhe_refund_core::{
    decode_clear_values, Address, BusinessKey, CiphertextHandle, ClaimRecord, ProofVerifier,
    TxHash,
};

use crate::error::{LedgerError, Result};
use crate::pending::{PendingTransaction, TxConfirmation};
use crate::traits::{ClaimReader, ClaimWriter, CreateClaimRequest};

/// In-memory claims contract.
///
/// Cloning yields another handle onto the same contract state.
#[derive(Clone)]
pub struct MemoryLedger {
    contract: Address,
    verifier: Arc<dyn ProofVerifier>,
    inner: Arc<RwLock<LedgerState>>,
}

#[derive(Default)]
struct LedgerState {
    /// Keys in creation order.
    order: Vec<BusinessKey>,
    claims: HashMap<BusinessKey, StoredClaim>,
    block_number: u64,
    /// Transactions ever submitted, including failed ones.
    submitted: u64,
}

struct StoredClaim {
    record: ClaimRecord,
    handle: CiphertextHandle,
}

enum Call {
    CreateClaim(CreateClaimRequest),
    VerifyDecryption {
        key: BusinessKey,
        abi_encoded_clear_values: Bytes,
        proof: Bytes,
    },
}

impl MemoryLedger {
    /// Create an empty contract at `contract`.
    pub fn new(contract: Address, verifier: Arc<dyn ProofVerifier>) -> Self {
        Self {
            contract,
            verifier,
            inner: Arc::new(RwLock::new(LedgerState::default())),
        }
    }

    /// A signer-bound view for `address`.
    pub fn signer(&self, address: Address) -> MemorySigner {
        MemorySigner {
            ledger: self.clone(),
            address,
            decline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of transactions submitted so far.
    pub fn transaction_count(&self) -> u64 {
        self.read().submitted
    }

    /// Number of claims stored.
    pub fn claim_count(&self) -> usize {
        self.read().order.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit(&self, from: Address, call: Call) -> PendingTransaction {
        let tx_hash = {
            let mut state = self.write();
            state.submitted += 1;
            let mut hasher = blake3::Hasher::new();
            hasher.update(self.contract.as_bytes());
            hasher.update(from.as_bytes());
            hasher.update(&state.submitted.to_be_bytes());
            TxHash::from_bytes(*hasher.finalize().as_bytes())
        };

        let ledger = self.clone();
        PendingTransaction::new(tx_hash, async move {
            // Inclusion happens after the submitter has been handed the hash.
            tokio::task::yield_now().await;
            ledger.execute(from, call, tx_hash)
        })
    }

    fn execute(&self, from: Address, call: Call, tx_hash: TxHash) -> Result<TxConfirmation> {
        let mut state = self.write();
        let timestamp = now_secs();

        match call {
            Call::CreateClaim(request) => {
                if state.claims.contains_key(&request.key) {
                    return Err(revert("Business ID already exists"));
                }
                if !self.verifier.verify_input_proof(
                    &self.contract,
                    &from,
                    &request.handle,
                    &request.input_proof,
                ) {
                    return Err(revert("invalid input proof"));
                }

                let record = ClaimRecord {
                    name: request.name,
                    timestamp,
                    creator: from,
                    tax_rate_percent: request.tax_rate_percent,
                    reserved_public_value: request.reserved_public_value,
                    label: request.label,
                    is_verified: false,
                    decrypted_value: None,
                };
                state.order.push(request.key.clone());
                state.claims.insert(
                    request.key,
                    StoredClaim {
                        record,
                        handle: request.handle,
                    },
                );
            }
            Call::VerifyDecryption {
                key,
                abi_encoded_clear_values,
                proof,
            } => {
                let stored = state
                    .claims
                    .get_mut(&key)
                    .ok_or_else(|| revert("claim does not exist"))?;
                if stored.record.is_verified {
                    return Err(revert("Data already verified"));
                }
                if !self.verifier.verify_decryption_proof(
                    &[stored.handle],
                    &abi_encoded_clear_values,
                    &proof,
                ) {
                    return Err(revert("invalid decryption proof"));
                }
                let value = decode_clear_values(&abi_encoded_clear_values, 1)
                    .map_err(|e| revert(&e.to_string()))?[0];

                stored.record.is_verified = true;
                stored.record.decrypted_value = Some(value);
            }
        }

        state.block_number += 1;
        tracing::debug!(%tx_hash, block = state.block_number, "transaction included");
        Ok(TxConfirmation {
            tx_hash,
            block_number: state.block_number,
            timestamp,
        })
    }
}

#[async_trait]
impl ClaimReader for MemoryLedger {
    fn contract_address(&self) -> Address {
        self.contract
    }

    async fn list_claim_keys(&self) -> Result<Vec<BusinessKey>> {
        Ok(self.read().order.clone())
    }

    async fn get_claim(&self, key: &BusinessKey) -> Result<ClaimRecord> {
        self.read()
            .claims
            .get(key)
            .map(|c| c.record.clone())
            .ok_or_else(|| LedgerError::UnknownClaim(key.clone()))
    }

    async fn get_ciphertext_handle(&self, key: &BusinessKey) -> Result<CiphertextHandle> {
        self.read()
            .claims
            .get(key)
            .map(|c| c.handle)
            .ok_or_else(|| LedgerError::UnknownClaim(key.clone()))
    }
}

/// Signer-bound view onto a [`MemoryLedger`].
#[derive(Clone)]
pub struct MemorySigner {
    ledger: MemoryLedger,
    address: Address,
    decline: Arc<AtomicBool>,
}

impl MemorySigner {
    /// Make the simulated wallet decline (or accept again) every signature request.
    ///
    /// Shared by all clones of this signer.
    pub fn decline_signatures(&self, decline: bool) {
        self.decline.store(decline, Ordering::SeqCst);
    }

    fn sign(&self, call: Call) -> Result<PendingTransaction> {
        if self.decline.load(Ordering::SeqCst) {
            return Err(LedgerError::classify(
                "Wallet: user rejected transaction (action=\"sendTransaction\")",
            ));
        }
        Ok(self.ledger.submit(self.address, call))
    }
}

#[async_trait]
impl ClaimWriter for MemorySigner {
    fn signer(&self) -> Address {
        self.address
    }

    async fn create_claim(&self, request: CreateClaimRequest) -> Result<PendingTransaction> {
        self.sign(Call::CreateClaim(request))
    }

    async fn submit_verify_decryption(
        &self,
        key: &BusinessKey,
        abi_encoded_clear_values: Bytes,
        proof: Bytes,
    ) -> Result<PendingTransaction> {
        self.sign(Call::VerifyDecryption {
            key: key.clone(),
            abi_encoded_clear_values,
            proof,
        })
    }
}

fn revert(reason: &str) -> LedgerError {
    LedgerError::classify(format!("execution reverted: {reason}"))
}

/// Get current time in Unix seconds.
fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
