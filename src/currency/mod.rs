//! Currency handling.
//!
//! Rates are units of a currency per one unit of the configured base
//! currency. The [`CurrencyConverter`] caches live rates from a
//! [`RateSource`] and falls back to a static table when the source is
//! unavailable.

mod converter;
mod fallback;
mod source;

pub use converter::{CurrencyConverter, ExchangeRate};
pub use fallback::{FALLBACK_BASE_CURRENCY, FALLBACK_RATES, fallback_rate};
pub use source::{RateSource, StaticRateSource, UnavailableRateSource};
