//! ISR / IVA retention math.
//!
//! Platforms operating in Mexico withhold income tax (ISR) and half of the
//! IVA from each driver payout.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::pricing::calculators::round2;

use super::models::CountryTaxRates;

pub const DEFAULT_ISR_RATE_WITH_RFC: Decimal = dec!(0.025);
pub const DEFAULT_ISR_RATE_WITHOUT_RFC: Decimal = dec!(0.20);
pub const DEFAULT_IVA_RETENTION_RATE: Decimal = dec!(0.08);

/// Payout currency for a driver's country
pub fn currency_for_country(country_code: Option<&str>) -> &'static str {
    match country_code {
        Some("MX") => "MXN",
        _ => "USD",
    }
}

/// Rates applied to one payout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetentionRates {
    pub isr_rate: Decimal,
    pub iva_rate: Decimal,
}

impl RetentionRates {
    /// Pick rates from the country row, falling back to SAT defaults for
    /// missing or zero entries
    pub fn resolve(country: Option<&CountryTaxRates>, has_rfc: bool) -> Self {
        let pick = |value: Option<Decimal>, default: Decimal| {
            value.filter(|v| !v.is_zero()).unwrap_or(default)
        };

        let isr_rate = if has_rfc {
            pick(country.and_then(|c| c.isr_rate_with_rfc), DEFAULT_ISR_RATE_WITH_RFC)
        } else {
            pick(country.and_then(|c| c.isr_rate_without_rfc), DEFAULT_ISR_RATE_WITHOUT_RFC)
        };
        let iva_rate = pick(country.and_then(|c| c.iva_retention_rate), DEFAULT_IVA_RETENTION_RATE);

        Self { isr_rate, iva_rate }
    }
}

/// Retention breakdown for one payout
#[derive(Debug, Clone, PartialEq)]
pub struct Retention {
    pub gross_amount: Decimal,
    pub has_rfc: bool,
    pub isr_rate: Decimal,
    pub isr_amount: Decimal,
    pub iva_rate: Decimal,
    pub iva_amount: Decimal,
    /// The remaining IVA the driver must pay to SAT themselves
    pub iva_driver_owes: Decimal,
    pub net_amount: Decimal,
    pub currency: String,
}

/// Compute ISR and IVA retention for a Mexican driver payout
pub fn calculate_retention(gross_amount: Decimal, has_rfc: bool, rates: RetentionRates) -> Retention {
    let isr_amount = round2(gross_amount * rates.isr_rate);
    let iva_amount = round2(gross_amount * rates.iva_rate);
    let net_amount = round2(gross_amount - isr_amount - iva_amount);

    Retention {
        gross_amount,
        has_rfc,
        isr_rate: rates.isr_rate,
        isr_amount,
        iva_rate: rates.iva_rate,
        iva_amount,
        iva_driver_owes: iva_amount,
        net_amount,
        currency: "MXN".to_string(),
    }
}

/// Payout outside Mexico: nothing withheld
pub fn no_retention(gross_amount: Decimal, currency: &str) -> Retention {
    Retention {
        gross_amount,
        has_rfc: false,
        isr_rate: Decimal::ZERO,
        isr_amount: Decimal::ZERO,
        iva_rate: Decimal::ZERO,
        iva_amount: Decimal::ZERO,
        iva_driver_owes: Decimal::ZERO,
        net_amount: gross_amount,
        currency: currency.to_string(),
    }
}
