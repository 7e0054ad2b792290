//! Error types for the gateway module.

use fhe_refund_core::CiphertextHandle;
use thiserror::Error;

/// Errors that can occur during gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The capability has not been initialised for this session.
    #[error("encryption capability is not initialized")]
    NotInitialized,

    /// Initialisation failed.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    /// The plaintext does not fit the encrypted integer type.
    #[error("plaintext {value} exceeds maximum {max}")]
    PlaintextOutOfRange { value: u64, max: u64 },

    /// Encryption error.
    #[error("encryption error: {0}")]
    EncryptionFailure(String),

    /// Decryption or decryption-proof error.
    #[error("decryption error: {0}")]
    DecryptionFailure(String),

    /// No ciphertext is known under this handle.
    #[error("unknown ciphertext handle: {0}")]
    UnknownHandle(CiphertextHandle),

    /// The requester may not decrypt this handle.
    #[error("access denied for handle {0}")]
    AccessDenied(CiphertextHandle),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
