//! # FHE Refund Ledger
//!
//! Client-side interface to the claims contract, with an in-memory
//! implementation.
//!
//! ## Overview
//!
//! The contract is reached through two independent views: the read-only
//! [`ClaimReader`] and the signer-bound [`ClaimWriter`]. Writes return a
//! [`PendingTransaction`] whose inclusion is awaited separately, so a caller
//! can report "waiting for confirmation" between the two steps.
//!
//! ## Key Types
//!
//! - [`ClaimReader`] - `listAllClaimKeys`, `getClaim`, `getCiphertextHandle`
//! - [`ClaimWriter`] - `createClaim`, `verifyDecryption`
//! - [`PendingTransaction`] - A submitted transaction awaiting inclusion
//! - [`MemoryLedger`] - In-memory contract for tests and local runs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fhe_refund_core::{Address, ProofVerifier};
//! use fhe_refund_ledger::{ClaimReader, MemoryLedger};
//!
//! async fn example(verifier: Arc<dyn ProofVerifier>) {
//!     let ledger = MemoryLedger::new(Address::from_bytes([0xC0; 20]), verifier);
//!     let signer = ledger.signer(Address::from_bytes([0xAA; 20]));
//!
//!     let keys = ledger.list_claim_keys().await.unwrap();
//!     // let pending = signer.create_claim(request).await?;
//!     // let confirmation = pending.wait().await?;
//! }
//! ```
//!
//! ## Failure Classification
//!
//! Wallets and nodes report declined signatures and reverts as text.
//! [`LedgerError::classify`] turns such messages into
//! `TransactionRejected`, `AlreadyVerified`, or `TransactionFailure`.

pub mod error;
pub mod memory;
pub mod pending;
pub mod traits;

pub use error::{LedgerError, Result, ALREADY_VERIFIED_MARKER, USER_REJECTED_MARKER};
pub use memory::{MemoryLedger, MemorySigner};
pub use pending::{PendingTransaction, TxConfirmation};
pub use traits::{ClaimReader, ClaimWriter, CreateClaimRequest};
