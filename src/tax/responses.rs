//! Response DTOs for tax endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::Retention;

#[derive(Debug, Serialize)]
pub struct TaxRetentionResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_amount: Decimal,
    pub has_rfc: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub isr_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub isr_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub iva_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub iva_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub iva_driver_owes: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_amount: Decimal,
    pub currency: String,
}

impl From<Retention> for TaxRetentionResponse {
    fn from(r: Retention) -> Self {
        Self {
            gross_amount: r.gross_amount,
            has_rfc: r.has_rfc,
            isr_rate: r.isr_rate,
            isr_amount: r.isr_amount,
            iva_rate: r.iva_rate,
            iva_amount: r.iva_amount,
            iva_driver_owes: r.iva_driver_owes,
            net_amount: r.net_amount,
            currency: r.currency,
        }
    }
}
