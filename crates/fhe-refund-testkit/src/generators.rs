//! Proptest generators for property-based testing.

use proptest::prelude::*;

use fhe_refund_core::{
    Address, BusinessKey, Claim, ClaimDraft, ClaimRecord, MAX_TAX_RATE, MIN_TAX_RATE,
};

/// Generate a random address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a business key with the default prefix.
pub fn business_key() -> impl Strategy<Value = BusinessKey> {
    (0i64..=4_102_444_800_000)
        .prop_map(|ms| BusinessKey::from_millis(BusinessKey::DEFAULT_PREFIX, ms))
}

/// Generate an amount representable as `euint32`.
pub fn amount() -> impl Strategy<Value = u64> {
    0u64..=u64::from(u32::MAX)
}

/// Generate an accepted tax rate.
pub fn tax_rate() -> impl Strategy<Value = u32> {
    MIN_TAX_RATE..=MAX_TAX_RATE
}

/// Generate a draft that passes validation.
pub fn valid_draft() -> impl Strategy<Value = ClaimDraft> {
    ("[a-zA-Z][a-zA-Z0-9 ]{0,23}", amount(), tax_rate())
        .prop_map(|(name, amount, rate)| {
            ClaimDraft::new(name, amount.to_string(), rate.to_string())
        })
}

/// Generate a claim, verified or not.
pub fn claim() -> impl Strategy<Value = Claim> {
    (
        business_key(),
        address(),
        0u64..=2_000_000_000,
        tax_rate(),
        prop::option::of(amount()),
    )
        .prop_map(|(key, creator, timestamp, rate, value)| {
            let record = ClaimRecord {
                name: key.to_string(),
                timestamp,
                creator,
                tax_rate_percent: rate,
                reserved_public_value: 0,
                label: "Tax Refund Claim".into(),
                is_verified: value.is_some(),
                decrypted_value: value,
            };
            Claim::from_record(key, record, BusinessKey::DEFAULT_PREFIX, 0)
                .unwrap_or_else(|_| unreachable!("verified records carry a value"))
        })
}

/// Generate a claim set of at most `max_len` claims.
pub fn claims(max_len: usize) -> impl Strategy<Value = Vec<Claim>> {
    prop::collection::vec(claim(), 0..=max_len)
}
