//! Configuration type definitions.
//!
//! This module contains the structs deserialized from `settings.yaml`.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// Engine-wide settings.
///
/// Every field has a default, so a partial `settings.yaml` only overrides
/// what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollSettings {
    /// ISO code exchange rates are quoted against.
    pub base_currency: String,
    /// How long a fetched rate table stays fresh, in seconds.
    pub rate_cache_ttl_secs: u64,
    /// Upper bound on one rate fetch, in milliseconds.
    pub rate_fetch_timeout_ms: u64,
    /// How long to stay on fallback rates after a failed fetch, in seconds.
    /// Capped by the cache TTL.
    pub rate_retry_after_secs: u64,
    /// Share of basic salary paid as the performance bonus.
    pub performance_bonus_rate: Decimal,
    /// Page size used when a listing does not ask for one.
    pub default_page_limit: u32,
    /// Largest page size a listing may ask for.
    pub max_page_limit: u32,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            base_currency: "USD".to_string(),
            rate_cache_ttl_secs: 3600,
            rate_fetch_timeout_ms: 2000,
            rate_retry_after_secs: 60,
            performance_bonus_rate: dec!(0.10),
            default_page_limit: 10,
            max_page_limit: 100,
        }
    }
}

impl PayrollSettings {
    /// The rate cache time-to-live.
    pub fn rate_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.rate_cache_ttl_secs)
    }

    /// The rate fetch timeout.
    pub fn rate_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.rate_fetch_timeout_ms)
    }

    /// The wait after a failed rate fetch before fetching again.
    pub fn rate_retry_after(&self) -> Duration {
        Duration::from_secs(self.rate_retry_after_secs)
    }

    /// Checks that the settings are usable.
    pub fn validate(&self) -> PayrollResult<()> {
        let code = &self.base_currency;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(PayrollError::validation(
                "base_currency",
                format!("'{}' is not a three-letter ISO code", code),
            ));
        }
        if self.performance_bonus_rate < Decimal::ZERO
            || self.performance_bonus_rate > Decimal::ONE
        {
            return Err(PayrollError::validation(
                "performance_bonus_rate",
                "must be within [0, 1]",
            ));
        }
        if self.default_page_limit == 0 || self.default_page_limit > self.max_page_limit {
            return Err(PayrollError::validation(
                "default_page_limit",
                format!("must be between 1 and max_page_limit ({})", self.max_page_limit),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = PayrollSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.rate_cache_ttl(), Duration::from_secs(3600));
        assert_eq!(settings.rate_fetch_timeout(), Duration::from_millis(2000));
        assert_eq!(settings.rate_retry_after(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings: PayrollSettings = serde_yaml::from_str("base_currency: EUR\n").unwrap();
        assert_eq!(settings.base_currency, "EUR");
        assert_eq!(settings.max_page_limit, 100);
        assert_eq!(settings.performance_bonus_rate, dec!(0.10));
    }

    #[test]
    fn test_rejects_bad_currency_code() {
        let settings = PayrollSettings {
            base_currency: "usd".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(PayrollError::Validation { field, .. }) if field == "base_currency"
        ));
    }

    #[test]
    fn test_rejects_default_page_above_max() {
        let settings = PayrollSettings {
            default_page_limit: 200,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
