//! # FHE Refund Testkit
//!
//! Testing utilities for the FHE refund coordinator.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A loopback gateway, in-memory contract, and signer wired together
//! - **Faults**: A ledger reader that fails or lags on demand, and gated
//!   writer/gateway wrappers that park a flow mid-way
//! - **Generators**: Proptest strategies for drafts and claims
//! - **Golden vectors**: Refund analyses every client must reproduce
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use fhe_refund_testkit::fixtures::TestFixture;
//! use fhe_refund::ClaimDraft;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let coordinator = fixture.connected().await;
//!     let key = coordinator
//!         .create_claim(&ClaimDraft::new("groceries", "250", "20"))
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Fault Injection
//!
//! ```rust,ignore
//! let reader = Arc::new(FaultyReader::new(fixture.ledger.clone()));
//! let coordinator = fixture.coordinator_with(reader.clone());
//! reader.fail_key(&key);
//! ```
//!
//! ## Golden Vectors
//!
//! ```rust
//! use fhe_refund_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```

pub mod faults;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use faults::{FaultyReader, GatedGateway, GatedWriter};
pub use fixtures::{init_tracing, MemoryCoordinator, TestFixture, CONTRACT};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
