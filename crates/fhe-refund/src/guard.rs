//! Per-claim decryption guards.
//!
//! At most one decrypt-and-verify may run per claim. A guard is taken with
//! [`DecryptionGuards::try_acquire`] and released when the returned
//! [`DecryptionPermit`] is dropped, so every exit path (success, early
//! return, error, panic unwinding) releases it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fhe_refund_core::BusinessKey;

/// The set of claims with a decryption in flight.
#[derive(Debug, Clone, Default)]
pub struct DecryptionGuards {
    held: Arc<Mutex<HashSet<BusinessKey>>>,
}

impl DecryptionGuards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard for `key`, or `None` if it is already held.
    ///
    /// Not re-entrant: a holder asking again also gets `None`.
    pub fn try_acquire(&self, key: &BusinessKey) -> Option<DecryptionPermit> {
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(DecryptionPermit {
            key: key.clone(),
            held: Arc::clone(&self.held),
        })
    }

    pub fn is_held(&self, key: &BusinessKey) -> bool {
        self.lock().contains(key)
    }

    /// Number of guards currently held.
    pub fn held_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<BusinessKey>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof of holding the decryption guard for one claim.
#[derive(Debug)]
pub struct DecryptionPermit {
    key: BusinessKey,
    held: Arc<Mutex<HashSet<BusinessKey>>>,
}

impl DecryptionPermit {
    pub fn key(&self) -> &BusinessKey {
        &self.key
    }
}

impl Drop for DecryptionPermit {
    fn drop(&mut self) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_per_key() {
        let guards = DecryptionGuards::new();
        let a = BusinessKey::new("refund-1");
        let b = BusinessKey::new("refund-2");

        let permit = guards.try_acquire(&a).unwrap();
        assert!(guards.try_acquire(&a).is_none());
        assert!(guards.try_acquire(&b).is_some());
        assert_eq!(permit.key(), &a);
        assert!(guards.is_held(&a));
    }

    #[test]
    fn test_release_on_drop() {
        let guards = DecryptionGuards::new();
        let key = BusinessKey::new("refund-1");
        {
            let _permit = guards.try_acquire(&key).unwrap();
            assert_eq!(guards.held_count(), 1);
        }
        assert_eq!(guards.held_count(), 0);
        assert!(guards.try_acquire(&key).is_some());
    }

    #[test]
    fn test_release_on_unwind() {
        let guards = DecryptionGuards::new();
        let key = BusinessKey::new("refund-1");
        let cloned = guards.clone();
        let k = key.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _permit = cloned.try_acquire(&k).unwrap();
            panic!("flow aborted");
        }));
        assert!(result.is_err());
        assert!(!guards.is_held(&key));
    }
}
