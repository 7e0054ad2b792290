//! # FHE Refund Core
//!
//! Pure primitives for encrypted refund claims: identifiers, claim records,
//! transaction status, the clear-value codec, and refund analysis.
//!
//! This crate contains no I/O, no storage, no networking. Everything here is
//! deterministic computation over plain data.
//!
//! ## Key Types
//!
//! - [`Claim`] - A ledger-recorded encrypted receipt, as seen by the client
//! - [`ClaimRecord`] - The raw record returned by the ledger contract
//! - [`BusinessKey`] - The ledger-side identifier of a claim (`refund-<millis>`)
//! - [`CiphertextHandle`] - Opaque reference to an encrypted ledger value
//! - [`TransactionStatus`] - Closed status variant reported by each operation
//! - [`RefundAnalysis`] - Derived display metrics for a claim
//!
//! ## Rounding
//!
//! All analysis metrics use round-half-up over exact rational values. See
//! [`analysis`] module.

pub mod abi;
pub mod analysis;
pub mod claim;
pub mod error;
pub mod stats;
pub mod status;
pub mod types;
pub mod validation;
pub mod verifier;

pub use abi::{decode_clear_values, encode_clear_values, WORD_SIZE};
pub use analysis::{analyze, analyze_claim, RefundAnalysis, DEFAULT_AMOUNT, DEFAULT_TAX_RATE};
pub use claim::{
    AmountDisplay, Claim, ClaimPhase, ClaimRecord, ClaimView, LocalDecryption, Verification,
};
pub use error::{CoreError, ValidationError};
pub use stats::{DashboardStats, RECENT_WINDOW_SECS};
pub use status::{OperationId, StatusKind, TransactionStatus};
pub use types::{Address, BusinessKey, CiphertextHandle, TxHash};
pub use validation::{validate_draft, ClaimDraft, ValidDraft, MAX_TAX_RATE, MIN_TAX_RATE};
pub use verifier::ProofVerifier;
