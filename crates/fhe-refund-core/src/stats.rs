//! Dashboard statistics over a loaded claim set.

use serde::{Deserialize, Serialize};

use crate::claim::Claim;

/// Window for counting a claim as recent (seconds).
pub const RECENT_WINDOW_SECS: u64 = 60 * 60 * 24 * 7;

/// Aggregate figures shown above the claim list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_claims: usize,
    pub verified_claims: usize,
    /// Sum of verified values divided by all claims (unverified count as 0).
    pub average_refund: f64,
    /// Claims created within the last seven days.
    pub recent_claims: usize,
}

impl DashboardStats {
    /// Compute statistics at `now_secs` (Unix seconds).
    pub fn compute(claims: &[Claim], now_secs: u64) -> Self {
        let total_claims = claims.len();
        let verified_claims = claims.iter().filter(|c| c.is_verified()).count();
        let sum: u128 = claims
            .iter()
            .filter_map(|c| c.decrypted_value())
            .map(u128::from)
            .sum();
        let average_refund = if total_claims == 0 {
            0.0
        } else {
            sum as f64 / total_claims as f64
        };
        let recent_claims = claims
            .iter()
            .filter(|c| now_secs.saturating_sub(c.created_at) < RECENT_WINDOW_SECS)
            .count();

        Self {
            total_claims,
            verified_claims,
            average_refund,
            recent_claims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::ClaimRecord;
    use crate::types::{Address, BusinessKey};

    fn claim(key: &str, created_at: u64, value: Option<u64>) -> Claim {
        let record = ClaimRecord {
            name: key.into(),
            timestamp: created_at,
            creator: Address::ZERO,
            tax_rate_percent: 10,
            reserved_public_value: 0,
            label: String::new(),
            is_verified: value.is_some(),
            decrypted_value: value,
        };
        Claim::from_record(BusinessKey::new(key), record, "refund-", 0).unwrap()
    }

    #[test]
    fn test_empty() {
        let stats = DashboardStats::compute(&[], 1_000);
        assert_eq!(stats.total_claims, 0);
        assert_eq!(stats.average_refund, 0.0);
    }

    #[test]
    fn test_counts() {
        let now = 10 * RECENT_WINDOW_SECS;
        let claims = vec![
            claim("refund-1", now - 10, Some(300)),
            claim("refund-2", now - RECENT_WINDOW_SECS, None),
            claim("refund-3", now - 5, Some(100)),
            claim("refund-4", now + 30, None),
        ];
        let stats = DashboardStats::compute(&claims, now);
        assert_eq!(stats.total_claims, 4);
        assert_eq!(stats.verified_claims, 2);
        assert_eq!(stats.average_refund, 100.0);
        assert_eq!(stats.recent_claims, 3);
    }
}
