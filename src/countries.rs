//! Supported payroll countries.

use serde::Serialize;

/// A country the engine can run payroll for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountryInfo {
    /// The code used to address the country in payroll requests.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// ISO code of the payroll currency.
    pub currency: &'static str,
}

/// Currency used for countries outside the registry.
pub const DEFAULT_CURRENCY: &str = "USD";

const SUPPORTED_COUNTRIES: [CountryInfo; 20] = [
    country("US", "United States", "USD"),
    country("UK", "United Kingdom", "GBP"),
    country("India", "India", "INR"),
    country("Singapore", "Singapore", "SGD"),
    country("Australia", "Australia", "AUD"),
    country("Canada", "Canada", "CAD"),
    country("Germany", "Germany", "EUR"),
    country("France", "France", "EUR"),
    country("Japan", "Japan", "JPY"),
    country("UAE", "United Arab Emirates", "AED"),
    country("China", "China", "CNY"),
    country("Brazil", "Brazil", "BRL"),
    country("Mexico", "Mexico", "MXN"),
    country("South Africa", "South Africa", "ZAR"),
    country("Netherlands", "Netherlands", "EUR"),
    country("Spain", "Spain", "EUR"),
    country("Italy", "Italy", "EUR"),
    country("Sweden", "Sweden", "SEK"),
    country("Switzerland", "Switzerland", "CHF"),
    country("Malaysia", "Malaysia", "MYR"),
];

const fn country(code: &'static str, name: &'static str, currency: &'static str) -> CountryInfo {
    CountryInfo {
        code,
        name,
        currency,
    }
}

/// Lists every supported country.
pub fn supported_countries() -> &'static [CountryInfo] {
    &SUPPORTED_COUNTRIES
}

/// Looks up a supported country by code.
pub fn country_info(code: &str) -> Option<&'static CountryInfo> {
    SUPPORTED_COUNTRIES.iter().find(|c| c.code == code)
}

/// The payroll currency of `country`, USD when the country is not supported.
///
/// # Example
///
/// ```
/// use payroll_engine::countries::currency_for;
///
/// assert_eq!(currency_for("India"), "INR");
/// assert_eq!(currency_for("Atlantis"), "USD");
/// ```
pub fn currency_for(country: &str) -> &'static str {
    country_info(country).map_or(DEFAULT_CURRENCY, |c| c.currency)
}
