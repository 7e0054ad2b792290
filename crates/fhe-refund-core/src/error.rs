//! Error types for the FHE Refund Core.

use thiserror::Error;

/// Core errors that can occur while decoding ledger data.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid ciphertext handle: {0}")]
    InvalidHandle(String),

    #[error("claim {0} is marked verified without a decrypted value")]
    VerifiedWithoutValue(String),

    #[error("clear value encoding: expected {expected} bytes, got {actual}")]
    ClearValueLength { expected: usize, actual: usize },

    #[error("clear value at index {0} does not fit in 64 bits")]
    ClearValueOverflow(usize),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Validation errors for a claim draft, raised before anything is encrypted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("claim name must not be empty")]
    EmptyName,

    #[error("amount must not be empty")]
    EmptyAmount,

    #[error("amount {0:?} is not a non-negative integer")]
    InvalidAmount(String),

    #[error("tax rate {0:?} is not an integer")]
    InvalidTaxRate(String),

    #[error("tax rate {got} is outside {min}..={max}")]
    TaxRateOutOfRange { got: u32, min: u32, max: u32 },
}
