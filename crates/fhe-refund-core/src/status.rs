//! Transaction status reported by coordinator operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one coordinator operation (a create, reload, or verify flow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// Discriminant of a [`TransactionStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Idle,
    Pending,
    Success,
    Error,
}

/// User-facing status of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Idle,
    Pending(String),
    Success(String),
    Error(String),
}

impl TransactionStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            TransactionStatus::Idle => StatusKind::Idle,
            TransactionStatus::Pending(_) => StatusKind::Pending,
            TransactionStatus::Success(_) => StatusKind::Success,
            TransactionStatus::Error(_) => StatusKind::Error,
        }
    }

    /// The message, or `None` for `Idle`.
    pub fn message(&self) -> Option<&str> {
        match self {
            TransactionStatus::Idle => None,
            TransactionStatus::Pending(m)
            | TransactionStatus::Success(m)
            | TransactionStatus::Error(m) => Some(m),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, TransactionStatus::Idle)
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Idle
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Idle => f.write_str("idle"),
            TransactionStatus::Pending(m) => write!(f, "pending: {m}"),
            TransactionStatus::Success(m) => write!(f, "success: {m}"),
            TransactionStatus::Error(m) => write!(f, "error: {m}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_message() {
        let status = TransactionStatus::Error("Transaction rejected by user".into());
        assert_eq!(status.kind(), StatusKind::Error);
        assert_eq!(status.message(), Some("Transaction rejected by user"));
        assert_eq!(TransactionStatus::default().message(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TransactionStatus::Pending("Verifying decryption on-chain...".into()).to_string(),
            "pending: Verifying decryption on-chain..."
        );
        assert_eq!(OperationId(3).to_string(), "op-3");
    }
}
