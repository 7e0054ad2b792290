//! # FHE Refund Gateway
//!
//! The encryption capability consumed by the claim coordinator.
//!
//! ## Overview
//!
//! The homomorphic scheme itself is out of scope. This crate defines what
//! the coordinator needs from it, [`EncryptionGateway`], and ships a
//! [`LoopbackGateway`] that satisfies the same contract in-process.
//!
//! ## Two-Phase Decryption
//!
//! ```text
//! Coordinator                Gateway                   Ledger
//!   |-- request_decryption_proof -->|                      |
//!   |<------ DecryptionProof -------|                      |
//!   |-------------- submit_verify_decryption ------------->|
//!   |<------------------ PendingTransaction ---------------|
//! ```
//!
//! The gateway never submits transactions; the caller owns the
//! transaction lifecycle.
//!
//! ## Loopback Model
//!
//! - **Sealing**: ChaCha20-Poly1305 under a session key, contract and owner as AAD
//! - **Handles**: Blake3 digest of the sealed value and its binding
//! - **Proofs**: Blake3 keyed hashes, checkable through [`ProofVerifier`]
//!
//! [`ProofVerifier`]: fhe_refund_core::ProofVerifier

pub mod crypto;
pub mod error;
pub mod loopback;
pub mod traits;

pub use crypto::{LoopbackKeys, SealedValue};
pub use error::{GatewayError, Result};
pub use loopback::{LoopbackGateway, MAX_PLAINTEXT};
pub use traits::{DecryptionProof, EncryptedInput, EncryptionGateway};
