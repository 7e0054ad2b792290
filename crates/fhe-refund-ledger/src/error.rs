//! Error types for the ledger module.

use fhe_refund_core::{BusinessKey, CoreError};
use thiserror::Error;

/// Substring wallets put in the error when the user declines to sign.
pub const USER_REJECTED_MARKER: &str = "user rejected transaction";

/// Substring the contract puts in the revert reason for a repeated verification.
pub const ALREADY_VERIFIED_MARKER: &str = "Data already verified";

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A read-only view call failed.
    #[error("ledger read failed: {0}")]
    ReadFailure(String),

    /// The contract has no claim under this key.
    #[error("unknown claim: {0}")]
    UnknownClaim(BusinessKey),

    /// The user declined to sign.
    #[error("{}", USER_REJECTED_MARKER)]
    TransactionRejected,

    /// Submission or inclusion failed (revert, out of gas, transport).
    #[error("{0}")]
    TransactionFailure(String),

    /// The claim was verified by a concurrent verifier.
    #[error("{}: {}", ALREADY_VERIFIED_MARKER, .0)]
    AlreadyVerified(String),

    /// Ledger data could not be decoded.
    #[error("invalid ledger data: {0}")]
    InvalidData(#[from] CoreError),
}

impl LedgerError {
    /// Map a raw submission/inclusion error message to a variant.
    ///
    /// Wallets and nodes only report these conditions as text, so the
    /// distinction is made on known substrings.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(USER_REJECTED_MARKER) {
            LedgerError::TransactionRejected
        } else if message.contains(ALREADY_VERIFIED_MARKER) {
            LedgerError::AlreadyVerified(message)
        } else {
            LedgerError::TransactionFailure(message)
        }
    }

    /// Whether this error came from a read-only view.
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            LedgerError::ReadFailure(_) | LedgerError::UnknownClaim(_) | LedgerError::InvalidData(_)
        )
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rejection() {
        let err = LedgerError::classify("MetaMask: user rejected transaction (action=\"send\")");
        assert!(matches!(err, LedgerError::TransactionRejected));
    }

    #[test]
    fn test_classify_already_verified() {
        let err = LedgerError::classify("execution reverted: Data already verified");
        assert!(matches!(err, LedgerError::AlreadyVerified(_)));
        assert!(err.to_string().contains(ALREADY_VERIFIED_MARKER));
    }

    #[test]
    fn test_classify_other() {
        let err = LedgerError::classify("out of gas");
        assert!(matches!(err, LedgerError::TransactionFailure(ref m) if m == "out of gas"));
        assert!(!err.is_read_failure());
    }

    #[test]
    fn test_rejection_display_roundtrips() {
        let shown = LedgerError::TransactionRejected.to_string();
        assert!(matches!(
            LedgerError::classify(shown),
            LedgerError::TransactionRejected
        ));
    }
}
