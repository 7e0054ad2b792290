//! Error types for the coordinator.

use fhe_refund_core::{BusinessKey, CiphertextHandle, ValidationError};
use fhe_refund_gateway::GatewayError;
use fhe_refund_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur during coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// No signer is bound.
    #[error("wallet not connected")]
    NotConnected,

    /// The claim draft failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Encryption capability error.
    #[error("{0}")]
    Gateway(#[from] GatewayError),

    /// Ledger error.
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    /// A verification for this claim is already running.
    #[error("decryption already in progress for {0}")]
    DecryptionInFlight(BusinessKey),

    /// The decryption result did not cover the requested handle.
    #[error("no clear value returned for handle {0}")]
    MissingClearValue(CiphertextHandle),

    /// The claim is not in the loaded set.
    #[error("claim not found: {0}")]
    ClaimNotFound(BusinessKey),
}

impl CoordinatorError {
    /// Whether the user declined to sign.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CoordinatorError::Ledger(LedgerError::TransactionRejected))
    }
}

/// Result type for coordinator operations.
pub type Result<T> = std::result::Result<T, CoordinatorError>;
