//! Built-in tax schedules.
//!
//! Countries without a built-in schedule get the generic three-bracket rule.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{BracketPeriod, StandardDeduction, StatutoryContribution, TaxBracket, TaxRule};

/// Version label carried by every built-in schedule.
pub const DEFAULT_RULE_VERSION: &str = "builtin-2023";

/// Countries with a dedicated built-in schedule.
pub const BUILTIN_RULE_COUNTRIES: [&str; 5] = ["US", "UK", "India", "Singapore", "Australia"];

/// Builds the default rule for `country`.
///
/// Unknown countries receive the generic schedule under their own name.
pub fn default_tax_rule(country: &str) -> TaxRule {
    let (tax_brackets, standard_deductions, statutory_contributions) = match country {
        "US" => (
            brackets(&[
                (dec!(0), dec!(0.10)),
                (dec!(10276), dec!(0.12)),
                (dec!(41776), dec!(0.22)),
                (dec!(89076), dec!(0.24)),
                (dec!(170051), dec!(0.32)),
                (dec!(215951), dec!(0.35)),
                (dec!(539901), dec!(0.37)),
            ]),
            vec![StandardDeduction::fixed("Standard Deduction", dec!(12950))],
            vec![
                StatutoryContribution::new(
                    "Social Security",
                    dec!(0.062),
                    dec!(0.062),
                    Some(dec!(147000)),
                ),
                StatutoryContribution::new("Medicare", dec!(0.0145), dec!(0.0145), None),
            ],
        ),
        "UK" => (
            brackets(&[
                (dec!(0), dec!(0)),
                (dec!(12571), dec!(0.2)),
                (dec!(50271), dec!(0.4)),
                (dec!(150001), dec!(0.45)),
            ]),
            vec![StandardDeduction::fixed("Personal Allowance", dec!(12570))],
            vec![StatutoryContribution::new(
                "National Insurance",
                dec!(0.12),
                dec!(0.138),
                Some(dec!(50270)),
            )],
        ),
        "India" => (
            brackets(&[
                (dec!(0), dec!(0)),
                (dec!(250001), dec!(0.05)),
                (dec!(500001), dec!(0.1)),
                (dec!(750001), dec!(0.15)),
                (dec!(1000001), dec!(0.2)),
                (dec!(1250001), dec!(0.25)),
                (dec!(1500001), dec!(0.3)),
            ]),
            vec![StandardDeduction::fixed("Standard Deduction", dec!(50000))],
            vec![
                StatutoryContribution::new("Provident Fund", dec!(0.12), dec!(0.12), None),
                StatutoryContribution::new("ESI", dec!(0.0075), dec!(0.0325), Some(dec!(21000))),
            ],
        ),
        "Singapore" => (
            brackets(&[
                (dec!(0), dec!(0)),
                (dec!(20001), dec!(0.02)),
                (dec!(30001), dec!(0.035)),
                (dec!(40001), dec!(0.07)),
                (dec!(80001), dec!(0.115)),
                (dec!(120001), dec!(0.15)),
                (dec!(160001), dec!(0.18)),
                (dec!(200001), dec!(0.19)),
                (dec!(240001), dec!(0.195)),
                (dec!(280001), dec!(0.2)),
                (dec!(320001), dec!(0.22)),
            ]),
            vec![],
            vec![StatutoryContribution::new(
                "CPF",
                dec!(0.2),
                dec!(0.17),
                Some(dec!(6000)),
            )],
        ),
        "Australia" => (
            brackets(&[
                (dec!(0), dec!(0)),
                (dec!(18201), dec!(0.19)),
                (dec!(45001), dec!(0.325)),
                (dec!(120001), dec!(0.37)),
                (dec!(180001), dec!(0.45)),
            ]),
            vec![],
            vec![StatutoryContribution::new(
                "Superannuation",
                dec!(0),
                dec!(0.105),
                None,
            )],
        ),
        _ => (
            brackets(&[
                (dec!(0), dec!(0.1)),
                (dec!(10001), dec!(0.2)),
                (dec!(50001), dec!(0.3)),
            ]),
            vec![StandardDeduction::fixed("Standard Deduction", dec!(5000))],
            vec![StatutoryContribution::new(
                "Social Security",
                dec!(0.05),
                dec!(0.05),
                None,
            )],
        ),
    };

    TaxRule {
        country: country.to_string(),
        version: DEFAULT_RULE_VERSION.to_string(),
        bracket_period: BracketPeriod::Annual,
        tax_brackets,
        standard_deductions,
        statutory_contributions,
    }
}

/// Builds integer-unit brackets from `(min, rate)` pairs.
///
/// Each bracket ends one unit below the next bracket's `min`; the last is
/// open-ended.
fn brackets(steps: &[(Decimal, Decimal)]) -> Vec<TaxBracket> {
    steps
        .iter()
        .enumerate()
        .map(|(index, &(min, rate))| {
            let max = steps.get(index + 1).map(|&(next_min, _)| next_min - Decimal::ONE);
            TaxBracket::new(min, max, rate)
        })
        .collect()
}
