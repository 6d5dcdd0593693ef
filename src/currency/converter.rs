//! Exchange-rate resolution with caching and fallback.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::PayrollSettings;
use crate::error::{PayrollError, PayrollResult};
use crate::models::RateOrigin;

use super::fallback::fallback_rate;
use super::source::RateSource;

/// A resolved exchange rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// ISO code of the quoted currency.
    pub currency: String,
    /// Units of `currency` per one unit of the base currency.
    pub rate: Decimal,
    /// Where the rate came from.
    pub source: RateOrigin,
}

type RateTable = Arc<HashMap<String, Decimal>>;

/// The outcome of the last fetch. A failed fetch is cached as `None` so an
/// outage costs one timeout per retry window instead of one per lookup.
#[derive(Debug)]
struct CachedRates {
    table: Option<RateTable>,
    fetched_at: Instant,
    fresh_for: Duration,
}

/// Resolves exchange rates against a base currency.
///
/// Live rates are fetched through a [`RateSource`] and cached for the
/// configured TTL. A failed or slow fetch degrades to the static fallback
/// table; the failure is logged, never returned, and no new fetch is tried
/// until the retry window has passed.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use payroll_engine::config::PayrollSettings;
/// use payroll_engine::currency::{CurrencyConverter, UnavailableRateSource};
/// use payroll_engine::models::RateOrigin;
/// use rust_decimal_macros::dec;
///
/// # #[tokio::main]
/// # async fn main() {
/// let converter =
///     CurrencyConverter::new(Arc::new(UnavailableRateSource), &PayrollSettings::default());
/// let inr = converter.rate("INR").await.unwrap();
/// assert_eq!(inr.rate, dec!(83.12));
/// assert_eq!(inr.source, RateOrigin::Fallback);
/// # }
/// ```
pub struct CurrencyConverter {
    source: Arc<dyn RateSource>,
    base_currency: String,
    cache_ttl: Duration,
    fetch_timeout: Duration,
    retry_after: Duration,
    cache: RwLock<Option<CachedRates>>,
}

impl std::fmt::Debug for CurrencyConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyConverter")
            .field("base_currency", &self.base_currency)
            .field("cache_ttl", &self.cache_ttl)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("retry_after", &self.retry_after)
            .finish_non_exhaustive()
    }
}

impl CurrencyConverter {
    /// Creates a converter with an empty cache.
    pub fn new(source: Arc<dyn RateSource>, settings: &PayrollSettings) -> Self {
        Self {
            source,
            base_currency: settings.base_currency.clone(),
            cache_ttl: settings.rate_cache_ttl(),
            fetch_timeout: settings.rate_fetch_timeout(),
            retry_after: settings.rate_retry_after().min(settings.rate_cache_ttl()),
            cache: RwLock::new(None),
        }
    }

    /// The currency rates are quoted against.
    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Resolves the rate of `currency` against the base currency.
    ///
    /// The live table is consulted first, then the fallback table. A
    /// currency unknown to both is a validation error.
    pub async fn rate(&self, currency: &str) -> PayrollResult<ExchangeRate> {
        let currency = normalize_code(currency)?;
        let live = self.live_rates().await;

        if let Some(rate) = live.as_ref().and_then(|rates| rates.get(&currency)) {
            return Ok(ExchangeRate {
                currency,
                rate: *rate,
                source: RateOrigin::Live,
            });
        }

        if currency == self.base_currency {
            let source = if live.is_some() {
                RateOrigin::Live
            } else {
                RateOrigin::Fallback
            };
            return Ok(ExchangeRate {
                currency,
                rate: Decimal::ONE,
                source,
            });
        }

        match fallback_rate(&currency, &self.base_currency) {
            Some(rate) => {
                if live.is_some() {
                    debug!(
                        currency = %currency,
                        "Currency missing from live table, using fallback rate"
                    );
                }
                Ok(ExchangeRate {
                    currency,
                    rate,
                    source: RateOrigin::Fallback,
                })
            }
            None => Err(PayrollError::validation(
                "currency",
                format!("no exchange rate available for '{}'", currency),
            )),
        }
    }

    /// Converts `amount` from one currency to another, unrounded.
    ///
    /// Converting a currency to itself returns `amount` unchanged.
    pub async fn convert(&self, amount: Decimal, from: &str, to: &str) -> PayrollResult<Decimal> {
        let from = normalize_code(from)?;
        let to = normalize_code(to)?;
        if from == to {
            return Ok(amount);
        }

        let from_rate = self.rate(&from).await?;
        let to_rate = self.rate(&to).await?;
        Self::convert_with(amount, &from_rate, &to_rate)
    }

    /// Converts `amount` between two already-resolved rates, unrounded.
    ///
    /// Lets a caller convert many amounts against one consistent pair of
    /// rates without going back to the cache.
    pub fn convert_with(
        amount: Decimal,
        from: &ExchangeRate,
        to: &ExchangeRate,
    ) -> PayrollResult<Decimal> {
        if from.currency == to.currency {
            return Ok(amount);
        }

        amount
            .checked_div(from.rate)
            .and_then(|base| base.checked_mul(to.rate))
            .ok_or_else(|| {
                PayrollError::validation(
                    "amount",
                    format!("{} {} cannot be converted to {}", amount, from.currency, to.currency),
                )
            })
    }

    /// Populates the cache. Returns true if a live table was loaded.
    pub async fn warm_up(&self) -> bool {
        self.live_rates().await.is_some()
    }

    /// Returns true if a fresh live table is cached.
    pub async fn is_ready(&self) -> bool {
        matches!(self.fresh(self.cache.read().await.as_ref()), Some(Some(_)))
    }

    /// Drops the cached table or cached failure; the next lookup fetches again.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Returns the cached live table, refreshing it when stale.
    ///
    /// Refreshes are serialized by the write lock so concurrent lookups
    /// trigger a single fetch. `None` means the fallback table applies.
    async fn live_rates(&self) -> Option<RateTable> {
        if let Some(cached) = self.fresh(self.cache.read().await.as_ref()) {
            return cached;
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = self.fresh(cache.as_ref()) {
            return cached;
        }

        let fetched = tokio::time::timeout(
            self.fetch_timeout,
            self.source.fetch_rates(&self.base_currency),
        )
        .await;

        let (table, fresh_for) = match fetched {
            Ok(Ok(rates)) => {
                let rates = Arc::new(usable_rates(rates));
                debug!(
                    base_currency = %self.base_currency,
                    currencies = rates.len(),
                    "Refreshed exchange rate cache"
                );
                (Some(rates), self.cache_ttl)
            }
            Ok(Err(e)) => {
                warn!(
                    error = %e,
                    retry_after_secs = self.retry_after.as_secs(),
                    "Exchange rate source failed, using fallback rates"
                );
                (None, self.retry_after)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.fetch_timeout.as_millis() as u64,
                    retry_after_secs = self.retry_after.as_secs(),
                    "Exchange rate source timed out, using fallback rates"
                );
                (None, self.retry_after)
            }
        };

        *cache = Some(CachedRates {
            table: table.clone(),
            fetched_at: Instant::now(),
            fresh_for,
        });
        table
    }

    /// The cached outcome if it is still fresh: `Some(None)` is a cached failure.
    fn fresh(&self, cached: Option<&CachedRates>) -> Option<Option<RateTable>> {
        cached
            .filter(|cached| cached.fetched_at.elapsed() < cached.fresh_for)
            .map(|cached| cached.table.clone())
    }
}

/// Uppercases and checks a currency code.
fn normalize_code(currency: &str) -> PayrollResult<String> {
    let code = currency.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(PayrollError::validation(
            "currency",
            format!("'{}' is not a three-letter ISO code", currency),
        ))
    }
}

/// Drops non-positive rates and uppercases codes.
fn usable_rates(rates: HashMap<String, Decimal>) -> HashMap<String, Decimal> {
    rates
        .into_iter()
        .filter_map(|(code, rate)| {
            if rate > Decimal::ZERO {
                Some((code.trim().to_ascii_uppercase(), rate))
            } else {
                warn!(currency = %code, rate = %rate, "Ignoring non-positive live rate");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{StaticRateSource, UnavailableRateSource};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn live_source() -> Arc<dyn RateSource> {
        Arc::new(StaticRateSource::new([
            ("EUR".to_string(), dec("0.9")),
            ("INR".to_string(), dec("80")),
        ]))
    }

    /// Counts fetches and optionally stalls before answering.
    struct CountingSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl RateSource for CountingSource {
        async fn fetch_rates(&self, _base: &str) -> PayrollResult<HashMap<String, Decimal>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(HashMap::from([("EUR".to_string(), dec("0.95"))]))
        }
    }

    fn settings_with(ttl_secs: u64, timeout_ms: u64) -> PayrollSettings {
        PayrollSettings {
            rate_cache_ttl_secs: ttl_secs,
            rate_fetch_timeout_ms: timeout_ms,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_live_rate_preferred() {
        let converter = CurrencyConverter::new(live_source(), &PayrollSettings::default());
        let rate = converter.rate("eur").await.unwrap();
        assert_eq!(rate.currency, "EUR");
        assert_eq!(rate.rate, dec("0.9"));
        assert_eq!(rate.source, RateOrigin::Live);
    }

    #[tokio::test]
    async fn test_missing_live_currency_uses_fallback() {
        let converter = CurrencyConverter::new(live_source(), &PayrollSettings::default());
        let rate = converter.rate("SGD").await.unwrap();
        assert_eq!(rate.rate, dec("1.34"));
        assert_eq!(rate.source, RateOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_unavailable_source_degrades_to_fallback() {
        let converter =
            CurrencyConverter::new(Arc::new(UnavailableRateSource), &PayrollSettings::default());
        let rate = converter.rate("GBP").await.unwrap();
        assert_eq!(rate.rate, dec("0.78"));
        assert_eq!(rate.source, RateOrigin::Fallback);
        assert!(!converter.is_ready().await);
    }

    #[tokio::test]
    async fn test_unknown_currency_is_validation_error() {
        let converter =
            CurrencyConverter::new(Arc::new(UnavailableRateSource), &PayrollSettings::default());
        assert!(matches!(
            converter.rate("XYZ").await,
            Err(PayrollError::Validation { field, .. }) if field == "currency"
        ));
        assert!(converter.rate("EURO").await.is_err());
    }

    #[tokio::test]
    async fn test_base_currency_is_identity() {
        let converter =
            CurrencyConverter::new(Arc::new(UnavailableRateSource), &PayrollSettings::default());
        assert_eq!(converter.rate("USD").await.unwrap().rate, Decimal::ONE);
    }

    #[tokio::test]
    async fn test_cache_reused_within_ttl() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        });
        let converter = CurrencyConverter::new(source.clone(), &settings_with(3600, 1000));

        assert!(converter.warm_up().await);
        assert!(converter.is_ready().await);
        converter.rate("EUR").await.unwrap();
        converter.rate("INR").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        converter.invalidate().await;
        assert!(!converter.is_ready().await);
        converter.rate("EUR").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_refetches_every_lookup() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        });
        let converter = CurrencyConverter::new(source.clone(), &settings_with(0, 1000));

        converter.rate("EUR").await.unwrap();
        converter.rate("EUR").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_source_times_out_to_fallback() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(5),
        });
        let converter = CurrencyConverter::new(source, &settings_with(3600, 20));

        let rate = converter.rate("EUR").await.unwrap();
        assert_eq!(rate.rate, dec("0.92"));
        assert_eq!(rate.source, RateOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_retried_within_window() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(60),
        });
        let converter = CurrencyConverter::new(source.clone(), &settings_with(3600, 20));

        let started = Instant::now();
        for currency in ["EUR", "INR", "GBP", "USD", "EUR"] {
            let rate = converter.rate(currency).await.unwrap();
            assert_eq!(rate.source, RateOrigin::Fallback);
        }
        converter.convert(dec("100"), "EUR", "INR").await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!converter.is_ready().await);

        // Invalidating clears the cached failure too.
        converter.invalidate().await;
        converter.rate("EUR").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_window_is_capped_by_ttl() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(60),
        });
        let converter = CurrencyConverter::new(source.clone(), &settings_with(0, 20));

        converter.rate("EUR").await.unwrap();
        converter.rate("EUR").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_convert_with_resolved_rates() {
        let usd = ExchangeRate {
            currency: "USD".to_string(),
            rate: Decimal::ONE,
            source: RateOrigin::Fallback,
        };
        let inr = ExchangeRate {
            currency: "INR".to_string(),
            rate: dec("83.12"),
            source: RateOrigin::Fallback,
        };

        assert_eq!(CurrencyConverter::convert_with(dec("10"), &usd, &inr).unwrap(), dec("831.2"));
        assert_eq!(CurrencyConverter::convert_with(dec("10"), &inr, &inr).unwrap(), dec("10"));
    }

    #[tokio::test]
    async fn test_non_positive_live_rates_are_ignored() {
        let source = Arc::new(StaticRateSource::new([("EUR".to_string(), Decimal::ZERO)]));
        let converter = CurrencyConverter::new(source, &PayrollSettings::default());
        let rate = converter.rate("EUR").await.unwrap();
        assert_eq!(rate.source, RateOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_convert_between_currencies() {
        let converter = CurrencyConverter::new(live_source(), &PayrollSettings::default());
        // 90 EUR = 100 USD = 8000 INR
        let inr = converter.convert(dec("90"), "EUR", "INR").await.unwrap();
        assert_eq!(inr, dec("8000"));
        assert_eq!(
            converter.convert(dec("123.45"), "INR", "INR").await.unwrap(),
            dec("123.45")
        );
    }

    proptest! {
        #[test]
        fn test_convert_round_trip(cents in 0i64..100_000_000_000i64, pair in 0usize..6usize) {
            let pairs = [
                ("USD", "INR"),
                ("EUR", "JPY"),
                ("GBP", "SGD"),
                ("INR", "MYR"),
                ("CHF", "ZAR"),
                ("AUD", "CAD"),
            ];
            let (a, b) = pairs[pair];
            let amount = Decimal::new(cents, 2);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let back = runtime.block_on(async {
                let converter = CurrencyConverter::new(
                    Arc::new(UnavailableRateSource),
                    &PayrollSettings::default(),
                );
                let there = converter.convert(amount, a, b).await.unwrap();
                converter.convert(there, b, a).await.unwrap()
            });

            prop_assert!((back - amount).abs() <= dec("0.000001"), "{} -> {}", amount, back);
        }
    }
}
