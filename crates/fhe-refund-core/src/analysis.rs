//! Refund analysis: derived display metrics for a claim.
//!
//! The metrics are defined over real numbers:
//!
//! ```text
//! refund_amount   = round(amount * rate / 100)
//! tax_savings     = round(refund_amount * 0.3)
//! efficiency      = min(100, round(amount / 1000 * 100))
//! processing_time = max(1, round(10 - amount / 1000))
//! confidence      = min(95, round(amount / 500 * 100))
//! ```
//!
//! `round` is round-half-up (toward positive infinity on ties). Every
//! quotient is evaluated as an exact fraction of integers, so results do not
//! depend on floating-point representation and are identical on every
//! platform.

use serde::{Deserialize, Serialize};

use crate::claim::{Claim, ClaimView};

/// Amount used when a claim has neither a verified nor a local value.
pub const DEFAULT_AMOUNT: u64 = 100;

/// Tax rate used when a claim carries none.
pub const DEFAULT_TAX_RATE: u32 = 10;

/// Derived metrics for one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundAnalysis {
    pub refund_amount: u64,
    pub tax_savings: u64,
    /// Percentage, 0..=100.
    pub efficiency: u64,
    /// Days, at least 1.
    pub processing_time: u64,
    /// Percentage, 0..=95.
    pub confidence: u64,
}

/// Compute the analysis for an amount and tax rate.
pub fn analyze(amount: u64, tax_rate_percent: u32) -> RefundAnalysis {
    let amount = i128::from(amount);
    let rate = i128::from(tax_rate_percent);

    let refund_amount = round_half_up(amount * rate, 100);
    let tax_savings = round_half_up(refund_amount * 3, 10);
    let efficiency = round_half_up(amount * 100, 1000).min(100);
    let processing_time = round_half_up(10 * 1000 - amount, 1000).max(1);
    let confidence = round_half_up(amount * 100, 500).min(95);

    RefundAnalysis {
        refund_amount: saturate(refund_amount),
        tax_savings: saturate(tax_savings),
        efficiency: saturate(efficiency),
        processing_time: saturate(processing_time),
        confidence: saturate(confidence),
    }
}

/// Analyze a claim, resolving missing inputs.
///
/// The amount is the verified value, else the local decryption, else
/// [`DEFAULT_AMOUNT`]. A zero tax rate means absent and becomes
/// [`DEFAULT_TAX_RATE`].
pub fn analyze_claim(claim: &Claim, local_amount: Option<u64>) -> RefundAnalysis {
    let amount = claim
        .decrypted_value()
        .or(local_amount)
        .unwrap_or(DEFAULT_AMOUNT);
    let rate = match claim.tax_rate_percent {
        0 => DEFAULT_TAX_RATE,
        r => r,
    };
    analyze(amount, rate)
}

impl ClaimView {
    pub fn analysis(&self) -> RefundAnalysis {
        analyze_claim(&self.claim, self.local.as_ref().map(|l| l.value))
    }
}

/// `round(num / den)` with ties toward positive infinity; `den` must be positive.
fn round_half_up(num: i128, den: i128) -> i128 {
    (2 * num + den).div_euclid(2 * den)
}

fn saturate(v: i128) -> u64 {
    u64::try_from(v.max(0)).unwrap_or(u64::MAX)
}
