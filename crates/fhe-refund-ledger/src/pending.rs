//! Pending transactions: submitted, not yet included.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use fhe_refund_core::TxHash;

use crate::error::Result;

/// Inclusion receipt of a confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxConfirmation {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Block timestamp (Unix seconds).
    pub timestamp: u64,
}

type Inclusion = Pin<Box<dyn Future<Output = Result<TxConfirmation>> + Send + 'static>>;

/// A signed and broadcast transaction.
///
/// Awaiting [`wait`](Self::wait) blocks until the transport reports
/// inclusion or failure. There is no timeout and no way to withdraw the
/// transaction once it exists.
pub struct PendingTransaction {
    tx_hash: TxHash,
    inclusion: Inclusion,
}

impl PendingTransaction {
    /// Wrap a transaction hash and the future that resolves its inclusion.
    pub fn new<F>(tx_hash: TxHash, inclusion: F) -> Self
    where
        F: Future<Output = Result<TxConfirmation>> + Send + 'static,
    {
        Self {
            tx_hash,
            inclusion: Box::pin(inclusion),
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Wait for inclusion.
    pub async fn wait(self) -> Result<TxConfirmation> {
        self.inclusion.await
    }
}

impl fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}
