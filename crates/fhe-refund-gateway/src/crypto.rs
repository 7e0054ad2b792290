//! Key material for the loopback capability.
//!
//! Provides ChaCha20-Poly1305 sealing of plaintexts and Blake3 keyed-hash
//! proofs.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use fhe_refund_core::{Address, CiphertextHandle};
use rand::RngCore;

use crate::error::{GatewayError, Result};

const SEAL_CONTEXT: &str = "fhe-refund-loopback-v1 seal";
const PROOF_CONTEXT: &str = "fhe-refund-loopback-v1 proof";
const HANDLE_CONTEXT: &str = "fhe-refund-loopback-v1 handle";

/// A plaintext sealed under the session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedValue {
    pub nonce: [u8; 12],
    pub ciphertext: Vec<u8>,
}

impl SealedValue {
    /// Content-derived handle, bound to contract and owner.
    pub fn handle(&self, contract: &Address, owner: &Address) -> CiphertextHandle {
        let mut hasher = blake3::Hasher::new_derive_key(HANDLE_CONTEXT);
        hasher.update(&self.nonce);
        hasher.update(&self.ciphertext);
        hasher.update(contract.as_bytes());
        hasher.update(owner.as_bytes());
        CiphertextHandle::from_bytes(*hasher.finalize().as_bytes())
    }
}

/// Session key material: one sealing key and one proof key.
#[derive(Clone)]
pub struct LoopbackKeys {
    seal_key: [u8; 32],
    proof_key: [u8; 32],
}

impl LoopbackKeys {
    /// Generate fresh random keys.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        Self::from_seed(&seed)
    }

    /// Derive keys deterministically from a seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            seal_key: blake3::derive_key(SEAL_CONTEXT, seed),
            proof_key: blake3::derive_key(PROOF_CONTEXT, seed),
        }
    }

    /// Seal `value`; `contract` and `owner` are authenticated as associated data.
    pub fn seal(&self, value: u64, contract: &Address, owner: &Address) -> Result<SealedValue> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.seal_key)
            .map_err(|e| GatewayError::EncryptionFailure(e.to_string()))?;

        let mut nonce = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce);

        let aad = associated_data(contract, owner);
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &value.to_le_bytes(),
                    aad: &aad,
                },
            )
            .map_err(|e| GatewayError::EncryptionFailure(e.to_string()))?;

        Ok(SealedValue { nonce, ciphertext })
    }

    /// Open a sealed value.
    pub fn open(&self, sealed: &SealedValue, contract: &Address, owner: &Address) -> Result<u64> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.seal_key)
            .map_err(|e| GatewayError::DecryptionFailure(e.to_string()))?;

        let aad = associated_data(contract, owner);
        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(&sealed.nonce),
                Payload {
                    msg: &sealed.ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|e| GatewayError::DecryptionFailure(e.to_string()))?;

        let bytes: [u8; 8] = plaintext
            .as_slice()
            .try_into()
            .map_err(|_| GatewayError::DecryptionFailure("malformed plaintext".into()))?;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Proof that `handle` was produced for `contract` and `owner`.
    pub fn input_proof(
        &self,
        contract: &Address,
        owner: &Address,
        handle: &CiphertextHandle,
    ) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new_keyed(&self.proof_key);
        hasher.update(b"input");
        hasher.update(contract.as_bytes());
        hasher.update(owner.as_bytes());
        hasher.update(handle.as_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Proof that `abi_encoded_clear_values` decrypt `handles`.
    pub fn decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        abi_encoded_clear_values: &[u8],
    ) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new_keyed(&self.proof_key);
        hasher.update(b"decrypt");
        hasher.update(&(handles.len() as u64).to_be_bytes());
        for handle in handles {
            hasher.update(handle.as_bytes());
        }
        hasher.update(abi_encoded_clear_values);
        *hasher.finalize().as_bytes()
    }
}

/// Constant-time comparison of a received proof against the expected one.
pub fn proof_matches(expected: [u8; 32], received: &[u8]) -> bool {
    match <[u8; 32]>::try_from(received) {
        Ok(received) => blake3::Hash::from(expected) == blake3::Hash::from(received),
        Err(_) => false,
    }
}

fn associated_data(contract: &Address, owner: &Address) -> [u8; 40] {
    let mut aad = [0u8; 40];
    aad[..20].copy_from_slice(contract.as_bytes());
    aad[20..].copy_from_slice(owner.as_bytes());
    aad
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: Address = Address([0xC0; 20]);
    const OWNER: Address = Address([0xAA; 20]);

    #[test]
    fn test_seal_open() {
        let keys = LoopbackKeys::from_seed(&[7u8; 32]);
        let sealed = keys.seal(250, &CONTRACT, &OWNER).unwrap();
        assert_eq!(keys.open(&sealed, &CONTRACT, &OWNER).unwrap(), 250);
    }

    #[test]
    fn test_open_with_wrong_owner_fails() {
        let keys = LoopbackKeys::from_seed(&[7u8; 32]);
        let sealed = keys.seal(250, &CONTRACT, &OWNER).unwrap();
        let other = Address::from_bytes([0xBB; 20]);
        assert!(matches!(
            keys.open(&sealed, &CONTRACT, &other),
            Err(GatewayError::DecryptionFailure(_))
        ));
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let keys = LoopbackKeys::from_seed(&[7u8; 32]);
        let a = keys.seal(1, &CONTRACT, &OWNER).unwrap();
        let b = keys.seal(1, &CONTRACT, &OWNER).unwrap();
        assert_ne!(a.handle(&CONTRACT, &OWNER), b.handle(&CONTRACT, &OWNER));
    }

    #[test]
    fn test_proofs_are_key_bound() {
        let keys = LoopbackKeys::from_seed(&[1u8; 32]);
        let other = LoopbackKeys::from_seed(&[2u8; 32]);
        let handle = CiphertextHandle::from_bytes([0x33; 32]);

        let proof = keys.input_proof(&CONTRACT, &OWNER, &handle);
        assert!(proof_matches(keys.input_proof(&CONTRACT, &OWNER, &handle), &proof));
        assert!(!proof_matches(other.input_proof(&CONTRACT, &OWNER, &handle), &proof));
        assert!(!proof_matches(proof, &proof[..31]));
    }
}
