//! Coordinator configuration.

use std::time::Duration;

use fhe_refund_core::BusinessKey;

/// Environment variable overriding the success display window (milliseconds).
pub const SUCCESS_DISPLAY_ENV: &str = "FHE_REFUND_SUCCESS_DISPLAY_MS";

/// Environment variable overriding the error display window (milliseconds).
pub const ERROR_DISPLAY_ENV: &str = "FHE_REFUND_ERROR_DISPLAY_MS";

/// Configuration for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How long a success status stays visible before reverting to idle.
    pub success_display: Duration,
    /// How long an error status stays visible before reverting to idle.
    pub error_display: Duration,
    /// Prefix of business keys derived from creation time.
    pub key_prefix: String,
    /// Label submitted with every claim.
    pub claim_label: String,
    /// Value submitted in the reserved public slot.
    pub reserved_public_value: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            success_display: Duration::from_secs(2),
            error_display: Duration::from_secs(3),
            key_prefix: BusinessKey::DEFAULT_PREFIX.to_string(),
            claim_label: "Tax Refund Claim".to_string(),
            reserved_public_value: 0,
        }
    }
}

impl CoordinatorConfig {
    /// Defaults, with display windows overridable from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(d) = duration_from_env(SUCCESS_DISPLAY_ENV) {
            config.success_display = d;
        }
        if let Some(d) = duration_from_env(ERROR_DISPLAY_ENV) {
            config.error_display = d;
        }
        config
    }
}

fn duration_from_env(var: &str) -> Option<Duration> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(%var, value = %raw, "ignoring non-numeric display window");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.success_display, Duration::from_secs(2));
        assert_eq!(config.error_display, Duration::from_secs(3));
        assert_eq!(config.key_prefix, "refund-");
        assert_eq!(config.claim_label, "Tax Refund Claim");
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var(SUCCESS_DISPLAY_ENV, "500");
        std::env::set_var(ERROR_DISPLAY_ENV, "not-a-number");
        let config = CoordinatorConfig::from_env();
        std::env::remove_var(SUCCESS_DISPLAY_ENV);
        std::env::remove_var(ERROR_DISPLAY_ENV);

        assert_eq!(config.success_display, Duration::from_millis(500));
        assert_eq!(config.error_display, Duration::from_secs(3));
    }
}
