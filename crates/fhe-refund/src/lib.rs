//! # FHE Refund
//!
//! Client-side lifecycle coordinator for encrypted tax-refund claims.
//!
//! ## Overview
//!
//! A claim's amount never leaves the client in clear. The coordinator:
//!
//! - **Creates** claims: validate the draft, encrypt the amount, submit it
//!   with an input proof, wait for inclusion
//! - **Reloads** the claim set from the ledger, skipping records that fail
//!   to load
//! - **Decrypts and verifies**: obtain a decryption proof and record the
//!   cleartext on-chain, at most once per claim
//! - **Reports** each flow's progress as a [`TransactionStatus`]
//!
//! ## Lifecycle
//!
//! ```text
//! Unsubmitted -> PendingCreate -> Created -> PendingVerify -> Verified
//!                     |                          |
//!                     +-- failure: Unsubmitted   +-- failure: Created
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fhe_refund::{ClaimDraft, CoordinatorConfig, LifecycleCoordinator};
//! use fhe_refund::core::Address;
//! use fhe_refund::gateway::LoopbackGateway;
//! use fhe_refund::ledger::MemoryLedger;
//!
//! async fn example() {
//!     let gateway = Arc::new(LoopbackGateway::new());
//!     let ledger = MemoryLedger::new(Address::from_bytes([0xC0; 20]), gateway.clone());
//!     let signer = ledger.signer(Address::from_bytes([0xAA; 20]));
//!
//!     let coordinator = LifecycleCoordinator::new(ledger, gateway, CoordinatorConfig::default());
//!     coordinator.connect(signer).await.unwrap();
//!
//!     let key = coordinator
//!         .create_claim(&ClaimDraft::new("Q1 refund", "250", "20"))
//!         .await
//!         .unwrap();
//!     let value = coordinator.decrypt_and_verify(&key).await.unwrap();
//!     assert_eq!(value, Some(250));
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `fhe_refund::core` - Claim model, status, analysis
//! - `fhe_refund::ledger` - Ledger views and the in-memory contract
//! - `fhe_refund::gateway` - Encryption capability and the loopback gateway

pub mod config;
pub mod coordinator;
pub mod error;
pub mod guard;
pub mod status;
pub mod store;

// Re-export component crates
pub use fhe_refund_core as core;
pub use fhe_refund_gateway as gateway;
pub use fhe_refund_ledger as ledger;

pub use config::{CoordinatorConfig, ERROR_DISPLAY_ENV, SUCCESS_DISPLAY_ENV};
pub use coordinator::{messages, LifecycleCoordinator};
pub use error::{CoordinatorError, Result};
pub use guard::{DecryptionGuards, DecryptionPermit};
pub use status::{StatusBoard, StatusSnapshot};
pub use store::ClaimStore;

pub use fhe_refund_core::{
    BusinessKey, Claim, ClaimDraft, ClaimPhase, ClaimView, DashboardStats, LocalDecryption,
    OperationId, RefundAnalysis, TransactionStatus,
};
