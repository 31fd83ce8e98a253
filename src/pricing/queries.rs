//! Database queries for zone pricing resolution.

use sqlx::PgPool;

use crate::error::AppError;

use super::models::{StatePricingRow, ZonePricing};

/// Spatial lookup of the pricing zone containing a pickup point
pub async fn find_zone_pricing(
    pool: &PgPool,
    lat: f64,
    lng: f64,
    service_type: &str,
    vehicle_type: &str,
) -> Result<Option<ZonePricing>, AppError> {
    let zone = sqlx::query_as::<_, ZonePricing>(
        r#"
        SELECT
            zone_id::int8 AS zone_id,
            zone_name,
            COALESCE(state_code, 'MX') AS state_code,
            base_fare::numeric AS base_fare,
            per_km::numeric AS per_km,
            per_min::numeric AS per_min,
            min_fare::numeric AS min_fare,
            COALESCE(booking_fee, 0)::numeric AS booking_fee,
            night_multiplier::numeric AS night_multiplier,
            weekend_multiplier::numeric AS weekend_multiplier,
            max_surge_multiplier::numeric AS max_surge_multiplier,
            platform_fee_percent::numeric AS platform_fee_percent,
            COALESCE(currency, 'MXN') AS currency
        FROM get_pricing_for_location($1, $2, $3, $4)
        LIMIT 1
        "#,
    )
    .bind(lat)
    .bind(lng)
    .bind(service_type)
    .bind(vehicle_type)
    .fetch_optional(pool)
    .await?;

    Ok(zone)
}

/// Active state-level pricing for Mexico and a service type
pub async fn find_state_pricing(
    pool: &PgPool,
    service_type: &str,
) -> Result<Option<StatePricingRow>, AppError> {
    let row = sqlx::query_as::<_, StatePricingRow>(
        r#"
        SELECT
            state_code,
            base_fare::numeric AS base_fare,
            per_mile_rate::numeric AS per_mile_rate,
            per_minute_rate::numeric AS per_minute_rate,
            minimum_fare::numeric AS minimum_fare,
            booking_fee::numeric AS booking_fee,
            night_multiplier::numeric AS night_multiplier,
            weekend_multiplier::numeric AS weekend_multiplier,
            peak_multiplier::numeric AS peak_multiplier,
            platform_percentage::numeric AS platform_percentage
        FROM pricing_config
        WHERE country_code = 'MX'
          AND booking_type = $1
          AND is_active = true
        LIMIT 1
        "#,
    )
    .bind(service_type)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
