//! Live exchange-rate sources.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{PayrollError, PayrollResult};

/// A provider of live exchange rates.
///
/// Implementations wrap an exchange-rate feed. Rates are units of each
/// currency per one unit of `base_currency`. Failures are reported as
/// [`PayrollError::ExternalService`] and absorbed by the converter.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the current rate table for `base_currency`.
    async fn fetch_rates(&self, base_currency: &str) -> PayrollResult<HashMap<String, Decimal>>;
}

/// A rate source backed by a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    rates: HashMap<String, Decimal>,
}

impl StaticRateSource {
    /// Creates a source returning `rates` for every request.
    pub fn new(rates: impl IntoIterator<Item = (String, Decimal)>) -> Self {
        Self {
            rates: rates.into_iter().collect(),
        }
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn fetch_rates(&self, _base_currency: &str) -> PayrollResult<HashMap<String, Decimal>> {
        Ok(self.rates.clone())
    }
}

/// A rate source that always fails, leaving the converter on its fallback table.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRateSource;

#[async_trait]
impl RateSource for UnavailableRateSource {
    async fn fetch_rates(&self, _base_currency: &str) -> PayrollResult<HashMap<String, Decimal>> {
        Err(PayrollError::ExternalService {
            service: "exchange_rates".to_string(),
            message: "no live rate source configured".to_string(),
        })
    }
}
