//! Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &Currency = EUR;

/// Errors that can occur while calculating prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A decimal calculation overflowed.
    #[error("price calculation overflowed")]
    Overflow,

    /// An amount could not be represented in minor units of the currency.
    #[error("amount {0} cannot be represented in {1} minor units")]
    MinorUnits(Decimal, &'static str),

    /// Currency code is not one the storefront prices in.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Look up a supported currency by its ISO code.
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] for codes other than EUR, GBP and USD.
pub fn parse_currency(code: &str) -> Result<&'static Currency, PricingError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "EUR" => Ok(EUR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        _ => Err(PricingError::UnknownCurrency(code.to_string())),
    }
}

/// `(price + fees) × quantity`, the subtotal of one priced line.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the decimal arithmetic overflows.
pub fn line_subtotal(
    unit_price: Decimal,
    unit_fees: Decimal,
    quantity: u32,
) -> Result<Decimal, PricingError> {
    unit_price
        .checked_add(unit_fees)
        .and_then(|unit| unit.checked_mul(Decimal::from(quantity)))
        .ok_or(PricingError::Overflow)
}

/// Converts a decimal amount into money, rounding half away from zero to the
/// currency's minor unit.
///
/// # Errors
///
/// Returns [`PricingError::MinorUnits`] if the amount does not fit in minor units.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let scale = 10_i64
        .checked_pow(currency.exponent)
        .ok_or(PricingError::MinorUnits(amount, currency.iso_alpha_code))?;

    let minor_units = amount
        .checked_mul(Decimal::from(scale))
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .ok_or(PricingError::MinorUnits(amount, currency.iso_alpha_code))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Sums a sequence of decimal amounts into a total in the given currency.
///
/// Amounts are added exactly and the sum is rounded once, so the total of a
/// cart equals the total of the quote it was built from. An empty sequence
/// totals to zero.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: an amount or the sum overflowed.
/// - [`PricingError::MinorUnits`]: the sum does not fit in minor units.
pub fn total_price<I>(
    amounts: I,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError>
where
    I: IntoIterator<Item = Result<Decimal, PricingError>>,
{
    let sum = amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| {
            acc.checked_add(amount?).ok_or(PricingError::Overflow)
        })?;

    to_money(sum, currency)
}

/// Divides a total between `attendees`, returning zero when nobody attends.
///
/// # Errors
///
/// Returns [`PricingError::MinorUnits`] if the share does not fit in minor units.
pub fn per_person(
    total: Decimal,
    attendees: u32,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    if attendees == 0 {
        return Ok(Money::from_minor(0, currency));
    }

    let share = total
        .checked_div(Decimal::from(attendees))
        .ok_or(PricingError::Overflow)?;

    to_money(share, currency)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn line_subtotal_includes_fees() -> TestResult {
        let subtotal = line_subtotal(Decimal::new(50, 0), Decimal::new(5, 0), 2)?;

        assert_eq!(subtotal, Decimal::new(110, 0));

        Ok(())
    }

    #[test]
    fn line_subtotal_overflow_errors() {
        let result = line_subtotal(Decimal::MAX, Decimal::ONE, 1);

        assert_eq!(result, Err(PricingError::Overflow));
    }

    #[test]
    fn to_money_rounds_to_minor_units() -> TestResult {
        let money = to_money(Decimal::new(12_995, 3), EUR)?;

        assert_eq!(money, Money::from_minor(1300, EUR));

        Ok(())
    }

    #[test]
    fn to_money_rounds_midpoint_away_from_zero() -> TestResult {
        assert_eq!(
            to_money(Decimal::new(1_005, 3), EUR)?,
            Money::from_minor(101, EUR)
        );
        assert_eq!(
            to_money(Decimal::new(1_025, 3), EUR)?,
            Money::from_minor(103, EUR)
        );

        Ok(())
    }

    #[test]
    fn total_price_rounds_the_sum_once() -> TestResult {
        let eighth = Decimal::new(125, 3);

        let total = total_price([Ok(eighth), Ok(eighth)], EUR)?;

        assert_eq!(total, Money::from_minor(25, EUR));

        Ok(())
    }

    #[test]
    fn total_price_of_nothing_is_zero() -> TestResult {
        let total = total_price(std::iter::empty(), EUR)?;

        assert_eq!(total, Money::from_minor(0, EUR));

        Ok(())
    }

    #[test]
    fn total_price_sums_amounts() -> TestResult {
        let total = total_price(
            [Ok(Decimal::new(110, 0)), Ok(Decimal::new(2_505, 2))],
            EUR,
        )?;

        assert_eq!(total, Money::from_minor(13_505, EUR));

        Ok(())
    }

    #[test]
    fn total_price_propagates_amount_errors() {
        let result = total_price([Ok(Decimal::ONE), Err(PricingError::Overflow)], EUR);

        assert_eq!(result, Err(PricingError::Overflow));
    }

    #[test]
    fn per_person_without_attendees_is_zero() -> TestResult {
        assert_eq!(
            per_person(Decimal::new(410, 0), 0, EUR)?,
            Money::from_minor(0, EUR)
        );

        Ok(())
    }

    #[test]
    fn per_person_splits_total() -> TestResult {
        assert_eq!(
            per_person(Decimal::new(410, 0), 2, EUR)?,
            Money::from_minor(20_500, EUR)
        );

        Ok(())
    }

    #[test]
    fn parse_currency_accepts_supported_codes() -> TestResult {
        assert_eq!(parse_currency("eur")?, EUR);
        assert_eq!(parse_currency("GBP")?, GBP);
        assert_eq!(parse_currency(" USD ")?, USD);

        Ok(())
    }

    #[test]
    fn parse_currency_rejects_unknown_code() {
        assert!(matches!(
            parse_currency("ABC"),
            Err(PricingError::UnknownCurrency(code)) if code == "ABC"
        ));
    }
}
