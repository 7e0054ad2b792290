//! Loopback encryption capability.
//!
//! Stands in for the homomorphic scheme and its key-management service in
//! tests and local runs. Plaintexts are sealed under a session key and kept
//! in a handle table; proofs are keyed hashes the same instance can check,
//! which is why it also acts as the ledger's [`ProofVerifier`].

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use fhe_refund_core::{encode_clear_values, Address, CiphertextHandle, ProofVerifier};

use crate::crypto::{proof_matches, LoopbackKeys, SealedValue};
use crate::error::{GatewayError, Result};
use crate::traits::{DecryptionProof, EncryptedInput, EncryptionGateway};

/// Largest plaintext accepted (`euint32`).
pub const MAX_PLAINTEXT: u64 = u32::MAX as u64;

struct StoredInput {
    sealed: SealedValue,
    contract: Address,
    owner: Address,
}

/// In-process encryption capability.
pub struct LoopbackGateway {
    keys: LoopbackKeys,
    ready: AtomicBool,
    available: AtomicBool,
    inputs: RwLock<HashMap<CiphertextHandle, StoredInput>>,
}

impl LoopbackGateway {
    /// Create an uninitialised gateway with fresh keys.
    pub fn new() -> Self {
        Self::with_keys(LoopbackKeys::generate())
    }

    pub fn with_keys(keys: LoopbackKeys) -> Self {
        Self {
            keys,
            ready: AtomicBool::new(false),
            available: AtomicBool::new(true),
            inputs: RwLock::new(HashMap::new()),
        }
    }

    /// Simulate the capability going away (or coming back).
    ///
    /// While unavailable, initialisation fails and every operation returns
    /// an error.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of ciphertexts produced so far.
    pub fn ciphertext_count(&self) -> usize {
        self.inputs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(GatewayError::InitializationFailed(
                "capability unavailable".into(),
            ));
        }
        if !self.ready.load(Ordering::SeqCst) {
            return Err(GatewayError::NotInitialized);
        }
        Ok(())
    }

    /// Open one handle, checking it belongs to `contract`.
    fn open(&self, handle: &CiphertextHandle, contract: &Address) -> Result<(u64, Address)> {
        let inputs = self.inputs.read().unwrap_or_else(PoisonError::into_inner);
        let stored = inputs
            .get(handle)
            .ok_or(GatewayError::UnknownHandle(*handle))?;
        if &stored.contract != contract {
            return Err(GatewayError::DecryptionFailure(format!(
                "handle {handle} is not bound to contract {contract}"
            )));
        }
        let value = self.keys.open(&stored.sealed, &stored.contract, &stored.owner)?;
        Ok((value, stored.owner))
    }
}

impl Default for LoopbackGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EncryptionGateway for LoopbackGateway {
    async fn initialize(&self) -> Result<()> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(GatewayError::InitializationFailed(
                "capability unavailable".into(),
            ));
        }
        if !self.ready.swap(true, Ordering::SeqCst) {
            tracing::debug!("loopback gateway initialized");
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.available.load(Ordering::SeqCst) && self.ready.load(Ordering::SeqCst)
    }

    async fn encrypt(
        &self,
        contract: &Address,
        owner: &Address,
        plaintext: u64,
    ) -> Result<EncryptedInput> {
        self.ensure_ready()?;
        if plaintext > MAX_PLAINTEXT {
            return Err(GatewayError::PlaintextOutOfRange {
                value: plaintext,
                max: MAX_PLAINTEXT,
            });
        }

        let sealed = self.keys.seal(plaintext, contract, owner)?;
        let handle = sealed.handle(contract, owner);
        let proof = self.keys.input_proof(contract, owner, &handle);

        self.inputs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                handle,
                StoredInput {
                    sealed,
                    contract: *contract,
                    owner: *owner,
                },
            );

        Ok(EncryptedInput {
            handle,
            proof: Bytes::copy_from_slice(&proof),
        })
    }

    async fn request_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        contract: &Address,
        requester: &Address,
    ) -> Result<DecryptionProof> {
        self.ensure_ready()?;
        if handles.is_empty() {
            return Err(GatewayError::DecryptionFailure("no handles requested".into()));
        }

        let mut ordered = Vec::with_capacity(handles.len());
        let mut clear_values = BTreeMap::new();
        for handle in handles {
            let (value, _) = self.open(handle, contract)?;
            ordered.push(value);
            clear_values.insert(*handle, value);
        }

        let abi = encode_clear_values(&ordered);
        let proof = self.keys.decryption_proof(handles, &abi);
        tracing::debug!(%requester, count = handles.len(), "decryption proof produced");

        Ok(DecryptionProof {
            clear_values,
            abi_encoded_clear_values: Bytes::from(abi),
            proof: Bytes::copy_from_slice(&proof),
        })
    }

    async fn user_decrypt(
        &self,
        handle: &CiphertextHandle,
        contract: &Address,
        requester: &Address,
    ) -> Result<u64> {
        self.ensure_ready()?;
        let (value, owner) = self.open(handle, contract)?;
        if &owner != requester {
            return Err(GatewayError::AccessDenied(*handle));
        }
        Ok(value)
    }
}

impl ProofVerifier for LoopbackGateway {
    fn verify_input_proof(
        &self,
        contract: &Address,
        owner: &Address,
        handle: &CiphertextHandle,
        proof: &[u8],
    ) -> bool {
        proof_matches(self.keys.input_proof(contract, owner, handle), proof)
    }

    fn verify_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        abi_encoded_clear_values: &[u8],
        proof: &[u8],
    ) -> bool {
        proof_matches(
            self.keys.decryption_proof(handles, abi_encoded_clear_values),
            proof,
        )
    }
}
