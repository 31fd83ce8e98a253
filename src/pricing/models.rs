//! Database models for pricing queries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::FromRow;

/// Rates and multipliers for one zone/service/vehicle combination.
///
/// Resolved once per quote and never mutated while the quote is computed.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PricingConfig {
    pub base_fare: Decimal,
    pub per_km: Decimal,
    pub per_min: Decimal,
    pub min_fare: Decimal,
    pub booking_fee: Decimal,
    pub night_multiplier: Decimal,
    pub weekend_multiplier: Decimal,
    pub max_surge_multiplier: Decimal,
    /// 0-100
    pub platform_fee_percent: Decimal,
    pub currency: String,
}

/// Zone returned by `get_pricing_for_location`
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ZonePricing {
    pub zone_id: i64,
    pub zone_name: String,
    pub state_code: String,
    #[sqlx(flatten)]
    pub config: PricingConfig,
}

impl ZonePricing {
    /// Last-resort configuration (CDMX rates, Feb 2026)
    pub fn fallback() -> Self {
        Self {
            zone_id: 0,
            zone_name: "Default".to_string(),
            state_code: "MX".to_string(),
            config: PricingConfig {
                base_fare: dec!(8.00),
                per_km: dec!(3.60),
                per_min: dec!(1.80),
                min_fare: dec!(35.00),
                booking_fee: dec!(5),
                night_multiplier: dec!(1.25),
                weekend_multiplier: dec!(1.10),
                max_surge_multiplier: dec!(3.00),
                platform_fee_percent: dec!(20.00),
                currency: "MXN".to_string(),
            },
        }
    }
}

/// Row from the legacy `pricing_config` table (state-level rates).
///
/// Column names predate the km-based schema: `per_mile_rate` holds the
/// per-km rate for MX rows.
#[derive(Debug, Clone, FromRow)]
pub struct StatePricingRow {
    pub state_code: String,
    pub base_fare: Decimal,
    pub per_mile_rate: Decimal,
    pub per_minute_rate: Decimal,
    pub minimum_fare: Decimal,
    pub booking_fee: Option<Decimal>,
    pub night_multiplier: Option<Decimal>,
    pub weekend_multiplier: Option<Decimal>,
    pub peak_multiplier: Option<Decimal>,
    pub platform_percentage: Option<Decimal>,
}

impl From<StatePricingRow> for ZonePricing {
    fn from(row: StatePricingRow) -> Self {
        // Zero multipliers are treated like nulls
        let or_default = |value: Option<Decimal>, default: Decimal| {
            value.filter(|v| !v.is_zero()).unwrap_or(default)
        };

        Self {
            zone_id: 0,
            zone_name: row.state_code.clone(),
            state_code: row.state_code,
            config: PricingConfig {
                base_fare: row.base_fare,
                per_km: row.per_mile_rate,
                per_min: row.per_minute_rate,
                min_fare: row.minimum_fare,
                booking_fee: row.booking_fee.unwrap_or(Decimal::ZERO),
                night_multiplier: or_default(row.night_multiplier, dec!(1.25)),
                weekend_multiplier: or_default(row.weekend_multiplier, dec!(1.10)),
                max_surge_multiplier: or_default(row.peak_multiplier, dec!(2.00)),
                platform_fee_percent: row.platform_percentage.unwrap_or(dec!(20.00)),
                currency: "MXN".to_string(),
            },
        }
    }
}
