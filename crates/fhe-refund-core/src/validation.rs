//! Validation of claim drafts before encryption.
//!
//! Drafts arrive as raw form text. Empty or non-numeric amounts are
//! rejected here instead of being coerced to zero, so a typo can never be
//! encrypted and submitted as a zero-value claim.

use crate::error::ValidationError;

/// Lowest accepted tax rate (percent).
pub const MIN_TAX_RATE: u32 = 1;

/// Highest accepted tax rate (percent).
pub const MAX_TAX_RATE: u32 = 50;

/// Raw input for a new claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimDraft {
    pub name: String,
    pub amount: String,
    pub tax_rate: String,
}

impl ClaimDraft {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        tax_rate: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            tax_rate: tax_rate.into(),
        }
    }
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub name: String,
    pub amount: u64,
    pub tax_rate_percent: u32,
}

/// Validate a draft.
///
/// Checks, in order: non-empty name, non-empty amount made only of ASCII
/// digits, integer tax rate within `MIN_TAX_RATE..=MAX_TAX_RATE`.
pub fn validate_draft(draft: &ClaimDraft) -> Result<ValidDraft, ValidationError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let amount = draft.amount.trim();
    if amount.is_empty() {
        return Err(ValidationError::EmptyAmount);
    }
    if !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }
    let amount: u64 = amount
        .parse()
        .map_err(|_| ValidationError::InvalidAmount(amount.to_string()))?;

    let rate = draft.tax_rate.trim();
    let tax_rate_percent: u32 = rate
        .parse()
        .map_err(|_| ValidationError::InvalidTaxRate(rate.to_string()))?;
    if !(MIN_TAX_RATE..=MAX_TAX_RATE).contains(&tax_rate_percent) {
        return Err(ValidationError::TaxRateOutOfRange {
            got: tax_rate_percent,
            min: MIN_TAX_RATE,
            max: MAX_TAX_RATE,
        });
    }

    Ok(ValidDraft {
        name: name.to_string(),
        amount,
        tax_rate_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_draft() {
        let valid = validate_draft(&ClaimDraft::new(" Groceries ", "250", "20")).unwrap();
        assert_eq!(
            valid,
            ValidDraft {
                name: "Groceries".into(),
                amount: 250,
                tax_rate_percent: 20,
            }
        );
    }

    #[test]
    fn test_empty_amount_is_not_zero() {
        assert_eq!(
            validate_draft(&ClaimDraft::new("a", "", "10")),
            Err(ValidationError::EmptyAmount)
        );
    }

    #[test]
    fn test_non_numeric_amount() {
        for bad in ["12a", "-5", "+5", "1.5", "1e3"] {
            assert_eq!(
                validate_draft(&ClaimDraft::new("a", bad, "10")),
                Err(ValidationError::InvalidAmount(bad.into())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_amount_overflow() {
        assert!(matches!(
            validate_draft(&ClaimDraft::new("a", "99999999999999999999999", "10")),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_tax_rate_bounds() {
        assert!(validate_draft(&ClaimDraft::new("a", "1", "1")).is_ok());
        assert!(validate_draft(&ClaimDraft::new("a", "1", "50")).is_ok());
        assert_eq!(
            validate_draft(&ClaimDraft::new("a", "1", "0")),
            Err(ValidationError::TaxRateOutOfRange { got: 0, min: 1, max: 50 })
        );
        assert_eq!(
            validate_draft(&ClaimDraft::new("a", "1", "51")),
            Err(ValidationError::TaxRateOutOfRange { got: 51, min: 1, max: 50 })
        );
        assert_eq!(
            validate_draft(&ClaimDraft::new("a", "1", "ten")),
            Err(ValidationError::InvalidTaxRate("ten".into()))
        );
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(
            validate_draft(&ClaimDraft::new("   ", "1", "10")),
            Err(ValidationError::EmptyName)
        );
    }
}
