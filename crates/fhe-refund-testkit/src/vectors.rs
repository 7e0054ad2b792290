//! Golden analysis vectors.
//!
//! Fixed inputs and the analysis every implementation must produce for them.
//! Stored as JSON so other clients can check against the same file.

use fhe_refund_core::{analyze, RefundAnalysis};
use serde::{Deserialize, Serialize};

/// A golden analysis vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: String,
    pub amount: u64,
    pub tax_rate_percent: u32,
    pub expected: RefundAnalysis,
}

const VECTORS_JSON: &str = r#"[
  {
    "name": "default amount and rate",
    "amount": 100,
    "tax_rate_percent": 10,
    "expected": { "refund_amount": 10, "tax_savings": 3, "efficiency": 10, "processing_time": 10, "confidence": 20 }
  },
  {
    "name": "half-up tie on refund",
    "amount": 250,
    "tax_rate_percent": 1,
    "expected": { "refund_amount": 3, "tax_savings": 1, "efficiency": 25, "processing_time": 10, "confidence": 50 }
  },
  {
    "name": "mid amount",
    "amount": 500,
    "tax_rate_percent": 10,
    "expected": { "refund_amount": 50, "tax_savings": 15, "efficiency": 50, "processing_time": 10, "confidence": 95 }
  },
  {
    "name": "one thousand",
    "amount": 1000,
    "tax_rate_percent": 10,
    "expected": { "refund_amount": 100, "tax_savings": 30, "efficiency": 100, "processing_time": 9, "confidence": 95 }
  },
  {
    "name": "large amount clamps",
    "amount": 20000,
    "tax_rate_percent": 50,
    "expected": { "refund_amount": 10000, "tax_savings": 3000, "efficiency": 100, "processing_time": 1, "confidence": 95 }
  },
  {
    "name": "zero amount",
    "amount": 0,
    "tax_rate_percent": 20,
    "expected": { "refund_amount": 0, "tax_savings": 0, "efficiency": 0, "processing_time": 10, "confidence": 0 }
  }
]"#;

/// Get all golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    // The embedded table is checked by `test_vectors_parse`.
    serde_json::from_str(VECTORS_JSON).unwrap_or_default()
}

/// Check every vector, returning the names of those that disagree.
pub fn verify_all_vectors() -> Vec<String> {
    all_vectors()
        .into_iter()
        .filter(|v| analyze(v.amount, v.tax_rate_percent) != v.expected)
        .map(|v| v.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_parse() {
        let vectors: Vec<GoldenVector> = serde_json::from_str(VECTORS_JSON).unwrap();
        assert_eq!(vectors.len(), 6);
    }

    #[test]
    fn test_all_vectors_hold() {
        assert!(verify_all_vectors().is_empty(), "{:?}", verify_all_vectors());
    }
}
