//! Database models for tax retention.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tax-relevant columns of a driver
#[derive(Debug, Clone, FromRow)]
pub struct DriverTaxProfile {
    pub id: Uuid,
    pub country_code: Option<String>,
    pub rfc: Option<String>,
    pub rfc_validated: Option<bool>,
}

impl DriverTaxProfile {
    /// The lower ISR rate only applies once the RFC has been validated
    pub fn has_validated_rfc(&self) -> bool {
        let has_rfc = self.rfc.as_deref().is_some_and(|rfc| !rfc.trim().is_empty());
        has_rfc && self.rfc_validated == Some(true)
    }

    pub fn is_mexican(&self) -> bool {
        self.country_code.as_deref() == Some("MX")
    }
}

/// Retention rates from the `countries` row
#[derive(Debug, Clone, Default, FromRow)]
pub struct CountryTaxRates {
    pub isr_rate_with_rfc: Option<Decimal>,
    pub isr_rate_without_rfc: Option<Decimal>,
    pub iva_retention_rate: Option<Decimal>,
}

/// Running totals in tax_monthly_summary
#[derive(Debug, Clone, FromRow)]
pub struct MonthlySummary {
    pub id: Uuid,
    pub total_gross: Decimal,
    pub total_isr_retained: Decimal,
    pub total_iva_retained: Decimal,
    pub total_iva_driver_owes: Decimal,
    pub total_net: Decimal,
    pub transaction_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Ride,
    Delivery,
    Tip,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Ride => "ride",
            TransactionType::Delivery => "delivery",
            TransactionType::Tip => "tip",
        }
    }
}
