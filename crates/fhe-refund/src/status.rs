//! Per-operation status tracking.
//!
//! Every coordinator flow gets its own [`OperationId`] and writes only its
//! own entry. Success and error entries expire after their display window;
//! pending entries stay until the flow replaces them. The global projection
//! is the most recently updated entry that has not expired, so one flow's
//! expiry never erases another flow's message.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use fhe_refund_core::{OperationId, TransactionStatus};
use tokio::time::Instant;

/// The visible status and which operation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// `None` when nothing is visible.
    pub operation: Option<OperationId>,
    pub status: TransactionStatus,
}

impl StatusSnapshot {
    fn idle() -> Self {
        Self {
            operation: None,
            status: TransactionStatus::Idle,
        }
    }
}

struct Entry {
    status: TransactionStatus,
    updated_at: Instant,
    /// Global update order.
    seq: u64,
}

#[derive(Default)]
struct BoardState {
    next_operation: u64,
    next_seq: u64,
    entries: BTreeMap<OperationId, Entry>,
}

/// Status entries for all live operations.
pub struct StatusBoard {
    success_display: Duration,
    error_display: Duration,
    state: Mutex<BoardState>,
}

impl StatusBoard {
    pub fn new(success_display: Duration, error_display: Duration) -> Self {
        Self {
            success_display,
            error_display,
            state: Mutex::new(BoardState::default()),
        }
    }

    /// Allocate an id for a new operation.
    pub fn begin(&self) -> OperationId {
        let mut state = self.lock();
        state.next_operation += 1;
        OperationId(state.next_operation)
    }

    /// Record the status of `operation`, replacing its previous one.
    pub fn set(&self, operation: OperationId, status: TransactionStatus) {
        let mut state = self.lock();
        state.next_seq += 1;
        let seq = state.next_seq;
        if status.is_idle() {
            state.entries.remove(&operation);
        } else {
            state.entries.insert(
                operation,
                Entry {
                    status,
                    updated_at: Instant::now(),
                    seq,
                },
            );
        }
    }

    /// Scope `operation`'s entry to the returned guard.
    ///
    /// Dropping the guard clears the entry if it is still `Pending`, so a
    /// flow abandoned mid-way does not leave a message that never expires.
    /// Terminal entries are left to expire normally.
    pub fn scope(&self, operation: OperationId) -> OperationScope<'_> {
        OperationScope {
            board: self,
            operation,
        }
    }

    fn clear_pending(&self, operation: OperationId) {
        let mut state = self.lock();
        let pending = matches!(
            state.entries.get(&operation),
            Some(Entry {
                status: TransactionStatus::Pending(_),
                ..
            })
        );
        if pending {
            state.entries.remove(&operation);
        }
    }

    /// Status of one operation; `Idle` once expired or if never set.
    pub fn status_of(&self, operation: OperationId) -> TransactionStatus {
        let mut state = self.lock();
        self.prune(&mut state);
        state
            .entries
            .get(&operation)
            .map(|e| e.status.clone())
            .unwrap_or(TransactionStatus::Idle)
    }

    /// The most recently updated visible status.
    pub fn current(&self) -> StatusSnapshot {
        let mut state = self.lock();
        self.prune(&mut state);
        state
            .entries
            .iter()
            .max_by_key(|(_, e)| e.seq)
            .map(|(op, e)| StatusSnapshot {
                operation: Some(*op),
                status: e.status.clone(),
            })
            .unwrap_or_else(StatusSnapshot::idle)
    }

    fn prune(&self, state: &mut BoardState) {
        let now = Instant::now();
        state
            .entries
            .retain(|_, e| match self.display_window(&e.status) {
                Some(window) => now.duration_since(e.updated_at) < window,
                None => true,
            });
    }

    fn display_window(&self, status: &TransactionStatus) -> Option<Duration> {
        match status {
            TransactionStatus::Success(_) => Some(self.success_display),
            TransactionStatus::Error(_) => Some(self.error_display),
            TransactionStatus::Pending(_) => None,
            TransactionStatus::Idle => Some(Duration::ZERO),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds one operation's status entry for the lifetime of a flow.
pub struct OperationScope<'a> {
    board: &'a StatusBoard,
    operation: OperationId,
}

impl OperationScope<'_> {
    pub fn id(&self) -> OperationId {
        self.operation
    }
}

impl Drop for OperationScope<'_> {
    fn drop(&mut self) {
        self.board.clear_pending(self.operation);
    }
}
