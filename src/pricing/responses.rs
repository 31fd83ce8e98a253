//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::services::PricedTrip;

/// Response for a fare quote.
///
/// Field names are consumed by the driver and rider apps; keep them stable.
#[derive(Debug, Serialize)]
pub struct PricingQuoteResponse {
    pub zone_id: i64,
    pub zone_name: String,
    pub currency: String,

    // Breakdown
    #[serde(with = "rust_decimal::serde::float")]
    pub base_fare: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_km: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub duration_min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub time_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub booking_fee: Decimal,

    // Multipliers
    pub is_night: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub night_multiplier: Decimal,
    pub is_weekend: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub weekend_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub surge_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub surge_amount: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub tolls: Decimal,

    // Totals
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    // Split
    #[serde(with = "rust_decimal::serde::float")]
    pub platform_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub driver_earnings: Decimal,

    // Display currency
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub fx_rate: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_display: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_currency: Option<String>,

    pub min_fare_applied: bool,
}

impl From<PricedTrip> for PricingQuoteResponse {
    fn from(priced: PricedTrip) -> Self {
        let PricedTrip { zone, quote } = priced;

        Self {
            zone_id: zone.zone_id,
            zone_name: zone.zone_name,
            currency: quote.currency,
            base_fare: quote.base_fare,
            distance_km: quote.distance_km,
            distance_amount: quote.distance_amount,
            duration_min: quote.duration_min,
            time_amount: quote.time_amount,
            booking_fee: quote.booking_fee,
            is_night: quote.is_night,
            night_multiplier: quote.night_multiplier,
            is_weekend: quote.is_weekend,
            weekend_multiplier: quote.weekend_multiplier,
            surge_multiplier: quote.surge_multiplier,
            surge_amount: quote.surge_amount,
            tolls: quote.tolls,
            subtotal: quote.subtotal,
            tax_rate: quote.tax_rate,
            tax_amount: quote.tax_amount,
            total: quote.total,
            platform_fee: quote.platform_fee,
            driver_earnings: quote.driver_earnings,
            fx_rate: quote.fx_rate,
            total_display: quote.total_display,
            display_currency: quote.display_currency,
            min_fare_applied: quote.min_fare_applied,
        }
    }
}
