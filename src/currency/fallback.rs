//! Static fallback exchange rates.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The currency the fallback table is quoted against.
pub const FALLBACK_BASE_CURRENCY: &str = "USD";

/// Units of each currency per one US dollar.
pub const FALLBACK_RATES: [(&str, Decimal); 16] = [
    ("USD", dec!(1)),
    ("EUR", dec!(0.92)),
    ("GBP", dec!(0.78)),
    ("JPY", dec!(150.25)),
    ("CAD", dec!(1.35)),
    ("AUD", dec!(1.52)),
    ("INR", dec!(83.12)),
    ("SGD", dec!(1.34)),
    ("AED", dec!(3.67)),
    ("CNY", dec!(7.24)),
    ("BRL", dec!(4.97)),
    ("MXN", dec!(17.05)),
    ("ZAR", dec!(18.62)),
    ("SEK", dec!(10.42)),
    ("CHF", dec!(0.88)),
    ("MYR", dec!(4.72)),
];

fn usd_rate(currency: &str) -> Option<Decimal> {
    FALLBACK_RATES
        .iter()
        .find(|(code, _)| *code == currency)
        .map(|(_, rate)| *rate)
}

/// Looks up the fallback rate of `currency` against `base_currency`.
///
/// The table is quoted in US dollars; other bases are derived by cross rate.
/// Returns `None` if either currency is missing from the table.
///
/// # Example
///
/// ```
/// use payroll_engine::currency::fallback_rate;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(fallback_rate("INR", "USD"), Some(dec!(83.12)));
/// assert_eq!(fallback_rate("XYZ", "USD"), None);
/// ```
pub fn fallback_rate(currency: &str, base_currency: &str) -> Option<Decimal> {
    let rate = usd_rate(currency)?;
    if base_currency == FALLBACK_BASE_CURRENCY {
        return Some(rate);
    }
    rate.checked_div(usd_rate(base_currency)?)
}
