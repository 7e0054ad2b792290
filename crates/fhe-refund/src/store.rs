//! Session-scoped cache of loaded claims.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use fhe_refund_core::{BusinessKey, Claim};

/// In-memory claim set, rebuilt only by full reload.
///
/// [`replace`](Self::replace) swaps the whole collection; there is no
/// incremental merge, so a claim missing from a reload disappears from the
/// store.
#[derive(Debug, Default)]
pub struct ClaimStore {
    inner: RwLock<Snapshot>,
}

#[derive(Debug, Default)]
struct Snapshot {
    claims: Vec<Claim>,
    generation: u64,
}

impl ClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection.
    pub fn replace(&self, claims: Vec<Claim>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.claims = claims;
        inner.generation += 1;
    }

    /// All claims in ledger order.
    pub fn all(&self) -> Vec<Claim> {
        self.read().claims.clone()
    }

    pub fn get(&self, key: &BusinessKey) -> Option<Claim> {
        self.read()
            .claims
            .iter()
            .find(|c| &c.business_key == key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.read().claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().claims.is_empty()
    }

    /// Number of completed replacements.
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhe_refund_core::{Address, ClaimRecord};

    fn claim(key: &str) -> Claim {
        let record = ClaimRecord {
            name: key.into(),
            timestamp: 0,
            creator: Address::ZERO,
            tax_rate_percent: 10,
            reserved_public_value: 0,
            label: String::new(),
            is_verified: false,
            decrypted_value: None,
        };
        Claim::from_record(BusinessKey::new(key), record, "refund-", 0).unwrap()
    }

    #[test]
    fn test_replace_not_merge() {
        let store = ClaimStore::new();
        store.replace(vec![claim("refund-1"), claim("refund-2")]);
        assert_eq!(store.len(), 2);

        store.replace(vec![claim("refund-3")]);
        assert_eq!(store.len(), 1);
        assert!(store.get(&BusinessKey::new("refund-1")).is_none());
        assert!(store.get(&BusinessKey::new("refund-3")).is_some());
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_empty() {
        let store = ClaimStore::new();
        assert!(store.is_empty());
        assert_eq!(store.generation(), 0);
    }
}
