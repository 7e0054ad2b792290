//! Claim records and the client-side claim model.
//!
//! The ledger returns a flat [`ClaimRecord`]. The client converts it into a
//! [`Claim`], whose [`Verification`] variant ties the verified flag to the
//! decrypted value so one cannot exist without the other.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Address, BusinessKey};

/// A claim as returned by the ledger's `getClaim` view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Free-text description supplied at creation.
    pub name: String,
    /// Inclusion time of the creating transaction (Unix seconds).
    pub timestamp: u64,
    /// Address that submitted the claim.
    pub creator: Address,
    /// Public tax rate, fixed at creation.
    pub tax_rate_percent: u32,
    /// Reserved public slot, submitted as zero by this client.
    pub reserved_public_value: u64,
    /// Free-text label supplied at creation.
    pub label: String,
    /// Whether a verify-decryption transaction has been accepted.
    pub is_verified: bool,
    /// Cleartext recorded by the verification transaction.
    pub decrypted_value: Option<u64>,
}

/// On-chain verification state of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verification {
    /// No verification transaction has been confirmed yet.
    Unverified,
    /// Verified on-chain; the value is authoritative.
    Verified { value: u64 },
}

/// A claim loaded from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Local identifier, unique within one loaded set.
    pub id: i64,
    /// Ledger-side identifier.
    pub business_key: BusinessKey,
    pub name: String,
    pub tax_rate_percent: u32,
    /// Unix seconds.
    pub created_at: u64,
    pub creator: Address,
    pub reserved_public_value: u64,
    pub label: String,
    pub verification: Verification,
}

impl Claim {
    /// Build a claim from its ledger record.
    ///
    /// The id comes from the millis suffix of the key; `fallback_id` is used
    /// when the key does not carry one.
    pub fn from_record(
        key: BusinessKey,
        record: ClaimRecord,
        key_prefix: &str,
        fallback_id: i64,
    ) -> Result<Self, CoreError> {
        let verification = match (record.is_verified, record.decrypted_value) {
            (true, Some(value)) => Verification::Verified { value },
            (true, None) => return Err(CoreError::VerifiedWithoutValue(key.to_string())),
            (false, _) => Verification::Unverified,
        };

        Ok(Self {
            id: key.parse_millis(key_prefix).unwrap_or(fallback_id),
            business_key: key,
            name: record.name,
            tax_rate_percent: record.tax_rate_percent,
            created_at: record.timestamp,
            creator: record.creator,
            reserved_public_value: record.reserved_public_value,
            label: record.label,
            verification,
        })
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.verification, Verification::Verified { .. })
    }

    /// The on-chain verified cleartext, if any.
    pub fn decrypted_value(&self) -> Option<u64> {
        match self.verification {
            Verification::Verified { value } => Some(value),
            Verification::Unverified => None,
        }
    }

    /// Steady-state lifecycle phase implied by the record.
    pub fn phase(&self) -> ClaimPhase {
        match self.verification {
            Verification::Verified { .. } => ClaimPhase::Verified,
            Verification::Unverified => ClaimPhase::Created,
        }
    }
}

/// Lifecycle of a claim.
///
/// `Unsubmitted` and `PendingCreate` exist only while a creation flow runs;
/// `PendingVerify` only while a decryption guard is held. `Verified` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimPhase {
    Unsubmitted,
    PendingCreate,
    Created,
    PendingVerify,
    Verified,
}

impl ClaimPhase {
    pub fn is_terminal(self) -> bool {
        self == ClaimPhase::Verified
    }
}

/// A value decrypted outside the ledger's trust boundary.
///
/// Only good for optimistic display. It is never written into a [`Claim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDecryption {
    pub business_key: BusinessKey,
    pub value: u64,
}

/// How a claim's amount should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountDisplay {
    /// On-chain verified value.
    Verified(u64),
    /// Unverified local decryption.
    LocalOnly(u64),
    /// Nothing decrypted yet.
    Encrypted,
}

/// A claim paired with an optional local decryption, as shown in a detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimView {
    pub claim: Claim,
    pub local: Option<LocalDecryption>,
}

impl ClaimView {
    /// Pair a claim with a local decryption. Decryptions of other claims are dropped.
    pub fn new(claim: Claim, local: Option<LocalDecryption>) -> Self {
        let local = local.filter(|l| l.business_key == claim.business_key);
        Self { claim, local }
    }

    pub fn amount_display(&self) -> AmountDisplay {
        match (self.claim.decrypted_value(), &self.local) {
            (Some(value), _) => AmountDisplay::Verified(value),
            (None, Some(local)) => AmountDisplay::LocalOnly(local.value),
            (None, None) => AmountDisplay::Encrypted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(verified: bool, value: Option<u64>) -> ClaimRecord {
        ClaimRecord {
            name: "groceries".into(),
            timestamp: 1_700_000_000,
            creator: Address::from_bytes([0x11; 20]),
            tax_rate_percent: 20,
            reserved_public_value: 0,
            label: "Tax Refund Claim".into(),
            is_verified: verified,
            decrypted_value: value,
        }
    }

    #[test]
    fn test_id_from_key_suffix() {
        let key = BusinessKey::new("refund-1700000000123");
        let claim = Claim::from_record(key, record(false, None), "refund-", 7).unwrap();
        assert_eq!(claim.id, 1_700_000_000_123);
        assert_eq!(claim.phase(), ClaimPhase::Created);
        assert_eq!(claim.decrypted_value(), None);
    }

    #[test]
    fn test_id_fallback_for_foreign_key() {
        let claim =
            Claim::from_record(BusinessKey::new("other"), record(false, None), "refund-", 7)
                .unwrap();
        assert_eq!(claim.id, 7);
    }

    #[test]
    fn test_verified_carries_value() {
        let claim = Claim::from_record(
            BusinessKey::new("refund-1"),
            record(true, Some(250)),
            "refund-",
            0,
        )
        .unwrap();
        assert!(claim.is_verified());
        assert_eq!(claim.decrypted_value(), Some(250));
        assert!(claim.phase().is_terminal());
    }

    #[test]
    fn test_verified_without_value_is_rejected() {
        let err = Claim::from_record(BusinessKey::new("refund-1"), record(true, None), "refund-", 0)
            .unwrap_err();
        assert!(matches!(err, CoreError::VerifiedWithoutValue(_)));
    }

    #[test]
    fn test_unverified_ignores_stale_value() {
        let claim = Claim::from_record(
            BusinessKey::new("refund-1"),
            record(false, Some(99)),
            "refund-",
            0,
        )
        .unwrap();
        assert_eq!(claim.verification, Verification::Unverified);
    }

    #[test]
    fn test_view_prefers_verified_value() {
        let key = BusinessKey::new("refund-1");
        let claim = Claim::from_record(key.clone(), record(true, Some(250)), "refund-", 0).unwrap();
        let local = LocalDecryption { business_key: key, value: 999 };
        let view = ClaimView::new(claim, Some(local));
        assert_eq!(view.amount_display(), AmountDisplay::Verified(250));
    }

    #[test]
    fn test_view_drops_foreign_local_decryption() {
        let claim = Claim::from_record(
            BusinessKey::new("refund-1"),
            record(false, None),
            "refund-",
            0,
        )
        .unwrap();
        let local = LocalDecryption { business_key: BusinessKey::new("refund-2"), value: 5 };
        let view = ClaimView::new(claim, Some(local));
        assert_eq!(view.local, None);
        assert_eq!(view.amount_display(), AmountDisplay::Encrypted);
    }
}
