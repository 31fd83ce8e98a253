//! Core fare calculation functions.
//!
//! Pure functions for pricing math - no database access, no clock access.
//! The evaluation order in [`compute_quote`] is part of its contract: moving a
//! rounding step changes totals.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::models::PricingConfig;

/// IVA (VAT) charged on every Mexican fare
pub const IVA_RATE: Decimal = dec!(0.16);

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use toro_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Shorthand for rounding to cents
pub fn round2(amount: Decimal) -> Decimal {
    round_money(amount, 2)
}

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Trip metrics to be priced.
///
/// Coordinates are only used to resolve the pricing zone, never by the
/// calculator itself.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub pickup: Coordinates,
    pub dropoff: Option<Coordinates>,
    pub distance_km: Decimal,
    pub duration_min: Decimal,
    pub tolls: Decimal,
    /// `None` means "same as the zone currency"
    pub display_currency: Option<String>,
}

/// Fully itemized fare breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResult {
    pub currency: String,

    pub base_fare: Decimal,
    pub distance_km: Decimal,
    pub distance_amount: Decimal,
    pub duration_min: Decimal,
    pub time_amount: Decimal,
    pub booking_fee: Decimal,

    pub is_night: bool,
    pub night_multiplier: Decimal,
    pub is_weekend: bool,
    pub weekend_multiplier: Decimal,
    pub surge_multiplier: Decimal,
    pub surge_amount: Decimal,

    pub tolls: Decimal,

    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,

    pub platform_fee: Decimal,
    pub driver_earnings: Decimal,

    pub fx_rate: Option<Decimal>,
    pub total_display: Option<Decimal>,
    pub display_currency: Option<String>,

    pub min_fare_applied: bool,
}

/// Errors raised by the calculator
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn out_of_range() -> QuoteError {
    QuoteError::InvalidInput("trip metrics out of range".to_string())
}

fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, QuoteError> {
    a.checked_mul(b).ok_or_else(out_of_range)
}

fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, QuoteError> {
    a.checked_add(b).ok_or_else(out_of_range)
}

/// Night pricing window: 22:00 - 06:00 local time
pub fn is_night_hour(now_local: &NaiveDateTime) -> bool {
    let hour = now_local.hour();
    hour >= 22 || hour < 6
}

pub fn is_weekend_day(now_local: &NaiveDateTime) -> bool {
    matches!(now_local.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Compute the fare breakdown for one trip.
///
/// # Arguments
/// * `request` - Trip metrics (distance, duration, tolls)
/// * `config` - Resolved zone pricing
/// * `now_local` - Wall-clock time in the pickup zone, used for night/weekend
/// * `surge_input` - Demand multiplier, capped at `config.max_surge_multiplier`
///
/// Display-currency fields are left empty; see [`QuoteResult::with_display_currency`].
pub fn compute_quote(
    request: &QuoteRequest,
    config: &PricingConfig,
    now_local: NaiveDateTime,
    surge_input: Decimal,
) -> Result<QuoteResult, QuoteError> {
    if request.distance_km <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput(
            "distance_km must be greater than zero".to_string(),
        ));
    }
    if request.duration_min <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput(
            "duration_min must be greater than zero".to_string(),
        ));
    }
    if request.tolls < Decimal::ZERO {
        return Err(QuoteError::InvalidInput(
            "tolls must not be negative".to_string(),
        ));
    }

    let is_night = is_night_hour(&now_local);
    let is_weekend = is_weekend_day(&now_local);
    let night_mult = if is_night { config.night_multiplier } else { Decimal::ONE };
    let weekend_mult = if is_weekend { config.weekend_multiplier } else { Decimal::ONE };

    let distance_amount = round2(checked_mul(request.distance_km, config.per_km)?);
    let time_amount = round2(checked_mul(request.duration_min, config.per_min)?);

    let pre_multipliers = [distance_amount, time_amount, config.booking_fee]
        .into_iter()
        .try_fold(config.base_fare, checked_add)?;

    // Below-1.0 inputs are not floored
    let capped_surge = surge_input.min(config.max_surge_multiplier);

    let after_time_multipliers =
        checked_mul(checked_mul(pre_multipliers, night_mult)?, weekend_mult)?;
    let mut subtotal = checked_mul(after_time_multipliers, capped_surge)?;
    let surge_amount = subtotal
        .checked_sub(after_time_multipliers)
        .ok_or_else(out_of_range)?;

    subtotal = checked_add(subtotal, request.tolls)?;

    // Floor applies after tolls, so tolls do not survive a floored fare
    let mut min_fare_applied = false;
    if subtotal < config.min_fare {
        subtotal = config.min_fare;
        min_fare_applied = true;
    }

    let subtotal = round2(subtotal);
    let tax_amount = round2(checked_mul(subtotal, IVA_RATE)?);
    let total = round2(checked_add(subtotal, tax_amount)?);

    let platform_fee = round2(checked_mul(subtotal, config.platform_fee_percent)? / dec!(100));
    let driver_earnings = round2(subtotal - platform_fee);

    Ok(QuoteResult {
        currency: config.currency.clone(),
        base_fare: config.base_fare,
        distance_km: request.distance_km,
        distance_amount,
        duration_min: request.duration_min,
        time_amount,
        booking_fee: config.booking_fee,
        is_night,
        night_multiplier: night_mult,
        is_weekend,
        weekend_multiplier: weekend_mult,
        surge_multiplier: capped_surge,
        surge_amount,
        tolls: request.tolls,
        subtotal,
        tax_rate: IVA_RATE,
        tax_amount,
        total,
        platform_fee,
        driver_earnings,
        fx_rate: None,
        total_display: None,
        display_currency: None,
        min_fare_applied,
    })
}

impl QuoteResult {
    /// Whether `display_currency` needs a conversion from this quote's currency
    pub fn needs_conversion(&self, display_currency: &str) -> bool {
        !display_currency.eq_ignore_ascii_case(&self.currency)
    }

    /// Attach display-currency fields.
    ///
    /// A missing rate leaves `fx_rate` and `total_display` empty instead of
    /// failing the quote. Base-currency amounts are never touched.
    pub fn with_display_currency(mut self, display_currency: &str, rate: Option<Decimal>) -> Self {
        if !self.needs_conversion(display_currency) {
            return self;
        }

        self.display_currency = Some(display_currency.to_uppercase());
        // A rate that overflows the total is treated like a missing one
        if let Some(total_display) = rate.and_then(|r| self.total.checked_mul(r)) {
            self.fx_rate = rate;
            self.total_display = Some(round2(total_display));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::ZonePricing;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    // Wednesday noon: no time multipliers
    fn weekday_noon() -> NaiveDateTime {
        at(2026, 10, 14, 12)
    }

    fn trip(distance_km: Decimal, duration_min: Decimal, tolls: Decimal) -> QuoteRequest {
        QuoteRequest {
            pickup: Coordinates { lat: 19.4326, lng: -99.1332 },
            dropoff: None,
            distance_km,
            duration_min,
            tolls,
            display_currency: None,
        }
    }

    fn default_config() -> PricingConfig {
        ZonePricing::fallback().config
    }

    fn tiny_config() -> PricingConfig {
        PricingConfig {
            base_fare: dec!(5),
            per_km: dec!(1),
            per_min: dec!(1),
            min_fare: dec!(35.00),
            booking_fee: dec!(0),
            ..default_config()
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round2(dec!(116.875)), dec!(116.88));
        assert_eq!(round2(dec!(116.865)), dec!(116.86));
        assert_eq!(round2(dec!(1.2351)), dec!(1.24));
        assert_eq!(round2(dec!(-1.234)), dec!(-1.23));
    }

    // ==================== compute_quote tests ====================

    #[test]
    fn test_weekday_daytime_quote() {
        let quote = compute_quote(
            &trip(dec!(10), dec!(20), dec!(0)),
            &default_config(),
            weekday_noon(),
            Decimal::ONE,
        )
        .unwrap();

        assert_eq!(quote.distance_amount, dec!(36.00));
        assert_eq!(quote.time_amount, dec!(36.00));
        assert!(!quote.is_night);
        assert!(!quote.is_weekend);
        assert_eq!(quote.night_multiplier, dec!(1));
        assert_eq!(quote.weekend_multiplier, dec!(1));
        assert_eq!(quote.surge_amount, dec!(0));
        assert_eq!(quote.subtotal, dec!(85.00));
        assert_eq!(quote.tax_rate, dec!(0.16));
        assert_eq!(quote.tax_amount, dec!(13.60));
        assert_eq!(quote.total, dec!(98.60));
        assert_eq!(quote.platform_fee, dec!(17.00));
        assert_eq!(quote.driver_earnings, dec!(68.00));
        assert!(!quote.min_fare_applied);
        assert_eq!(quote.currency, "MXN");
        assert!(quote.fx_rate.is_none());
    }

    #[test]
    fn test_night_and_weekend_multipliers_stack() {
        // Saturday 23:00
        let quote = compute_quote(
            &trip(dec!(10), dec!(20), dec!(0)),
            &default_config(),
            at(2026, 10, 17, 23),
            Decimal::ONE,
        )
        .unwrap();

        assert!(quote.is_night);
        assert!(quote.is_weekend);
        assert_eq!(quote.night_multiplier, dec!(1.25));
        assert_eq!(quote.weekend_multiplier, dec!(1.10));
        // 85 * 1.375 = 116.875, half-even to 116.88
        assert_eq!(quote.subtotal, dec!(116.88));
        assert_eq!(quote.tax_amount, dec!(18.70));
        assert_eq!(quote.total, dec!(135.58));
        assert_eq!(quote.platform_fee, dec!(23.38));
        assert_eq!(quote.driver_earnings, dec!(93.50));
    }

    #[test]
    fn test_night_window_boundaries() {
        assert!(is_night_hour(&at(2026, 10, 14, 22)));
        assert!(is_night_hour(&at(2026, 10, 14, 0)));
        assert!(is_night_hour(&at(2026, 10, 14, 5)));
        assert!(!is_night_hour(&at(2026, 10, 14, 6)));
        assert!(!is_night_hour(&at(2026, 10, 14, 21)));
    }

    #[test]
    fn test_weekend_days() {
        assert!(is_weekend_day(&at(2026, 10, 17, 12)));
        assert!(is_weekend_day(&at(2026, 10, 18, 12)));
        assert!(!is_weekend_day(&at(2026, 10, 19, 12)));
    }

    #[test]
    fn test_surge_is_capped() {
        let quote = compute_quote(
            &trip(dec!(10), dec!(20), dec!(0)),
            &default_config(),
            weekday_noon(),
            dec!(5.0),
        )
        .unwrap();

        assert_eq!(quote.surge_multiplier, dec!(3.00));
        assert_eq!(quote.subtotal, dec!(255.00));
        assert_eq!(quote.surge_amount, dec!(170));
    }

    #[test]
    fn test_surge_below_one_passes_through() {
        let quote = compute_quote(
            &trip(dec!(10), dec!(20), dec!(0)),
            &default_config(),
            weekday_noon(),
            dec!(0.8),
        )
        .unwrap();

        assert_eq!(quote.surge_multiplier, dec!(0.8));
        assert_eq!(quote.subtotal, dec!(68.00));
        assert_eq!(quote.surge_amount, dec!(-17));
    }

    #[test]
    fn test_min_fare_floor() {
        let quote = compute_quote(
            &trip(dec!(1), dec!(1), dec!(0)),
            &tiny_config(),
            weekday_noon(),
            Decimal::ONE,
        )
        .unwrap();

        assert_eq!(quote.subtotal, dec!(35.00));
        assert!(quote.min_fare_applied);
        assert_eq!(quote.tax_amount, dec!(5.60));
        assert_eq!(quote.total, dec!(40.60));
    }

    #[test]
    fn test_min_fare_floor_discards_tolls() {
        // 7.00 fare + 20.00 tolls = 27.00, still under the 35.00 floor
        let quote = compute_quote(
            &trip(dec!(1), dec!(1), dec!(20)),
            &tiny_config(),
            weekday_noon(),
            Decimal::ONE,
        )
        .unwrap();

        assert_eq!(quote.tolls, dec!(20));
        assert_eq!(quote.subtotal, dec!(35.00));
        assert!(quote.min_fare_applied);
    }

    #[test]
    fn test_tolls_added_above_floor() {
        let quote = compute_quote(
            &trip(dec!(1), dec!(1), dec!(50)),
            &tiny_config(),
            weekday_noon(),
            Decimal::ONE,
        )
        .unwrap();

        assert_eq!(quote.subtotal, dec!(57.00));
        assert!(!quote.min_fare_applied);
    }

    #[test]
    fn test_invalid_inputs() {
        let config = default_config();
        let cases = [
            trip(dec!(0), dec!(10), dec!(0)),
            trip(dec!(-1), dec!(10), dec!(0)),
            trip(dec!(5), dec!(0), dec!(0)),
            trip(dec!(5), dec!(10), dec!(-0.01)),
        ];

        for request in cases {
            let err = compute_quote(&request, &config, weekday_noon(), Decimal::ONE).unwrap_err();
            assert!(matches!(err, QuoteError::InvalidInput(_)), "{:?}", request);
        }
    }

    #[test]
    fn test_huge_metrics_are_rejected_not_panicking() {
        let huge = dec!(30000000000000000000000000000);
        let saturday_night = at(2026, 10, 17, 23);
        let cases = [
            trip(huge, dec!(10), dec!(0)),
            trip(dec!(5), huge, dec!(0)),
            trip(dec!(5), dec!(10), Decimal::MAX),
        ];

        for request in cases {
            let err = compute_quote(&request, &default_config(), saturday_night, dec!(3))
                .unwrap_err();
            assert_eq!(
                err,
                QuoteError::InvalidInput("trip metrics out of range".to_string())
            );
        }
    }

    #[test]
    fn test_display_conversion_overflow_omits_fields() {
        let quote = compute_quote(
            &trip(dec!(10), dec!(20), dec!(0)),
            &default_config(),
            weekday_noon(),
            Decimal::ONE,
        )
        .unwrap()
        .with_display_currency("USD", Some(Decimal::MAX));

        assert!(quote.fx_rate.is_none());
        assert!(quote.total_display.is_none());
        assert_eq!(quote.display_currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_split_and_tax_invariants() {
        let config = PricingConfig {
            platform_fee_percent: dec!(17.5),
            ..default_config()
        };
        let distances = [dec!(0.3), dec!(1.07), dec!(7.77), dec!(13.333), dec!(42.9)];
        let durations = [dec!(1), dec!(4.5), dec!(17.25), dec!(61)];

        for distance in distances {
            for duration in durations {
                let quote = compute_quote(
                    &trip(distance, duration, dec!(12.5)),
                    &config,
                    at(2026, 10, 18, 23),
                    dec!(1.37),
                )
                .unwrap();

                assert_eq!(quote.driver_earnings + quote.platform_fee, quote.subtotal);
                assert_eq!(
                    quote.total,
                    round2(quote.subtotal + round2(quote.subtotal * dec!(0.16)))
                );
                assert_eq!(quote.subtotal, round2(quote.subtotal));
            }
        }
    }

    #[test]
    fn test_identical_inputs_identical_results() {
        let request = trip(dec!(8.4), dec!(19), dec!(3));
        let first = compute_quote(&request, &default_config(), at(2026, 10, 17, 23), dec!(1.4)).unwrap();
        let second = compute_quote(&request, &default_config(), at(2026, 10, 17, 23), dec!(1.4)).unwrap();
        assert_eq!(first, second);
    }

    // ==================== display currency tests ====================

    #[test]
    fn test_display_currency_with_rate() {
        let quote = compute_quote(
            &trip(dec!(10), dec!(20), dec!(0)),
            &default_config(),
            weekday_noon(),
            Decimal::ONE,
        )
        .unwrap()
        .with_display_currency("usd", Some(dec!(0.052)));

        assert_eq!(quote.display_currency.as_deref(), Some("USD"));
        assert_eq!(quote.fx_rate, Some(dec!(0.052)));
        // 98.60 * 0.052 = 5.1272
        assert_eq!(quote.total_display, Some(dec!(5.13)));
        assert_eq!(quote.total, dec!(98.60));
    }

    #[test]
    fn test_display_currency_without_rate() {
        let base = compute_quote(
            &trip(dec!(10), dec!(20), dec!(0)),
            &default_config(),
            weekday_noon(),
            Decimal::ONE,
        )
        .unwrap();
        let quote = base.clone().with_display_currency("EUR", None);

        assert!(quote.fx_rate.is_none());
        assert!(quote.total_display.is_none());
        assert_eq!(quote.display_currency.as_deref(), Some("EUR"));
        assert_eq!(quote.subtotal, base.subtotal);
        assert_eq!(quote.total, base.total);
    }

    #[test]
    fn test_display_currency_same_as_base() {
        let quote = compute_quote(
            &trip(dec!(10), dec!(20), dec!(0)),
            &default_config(),
            weekday_noon(),
            Decimal::ONE,
        )
        .unwrap()
        .with_display_currency("mxn", Some(dec!(1)));

        assert!(quote.display_currency.is_none());
        assert!(quote.fx_rate.is_none());
        assert!(quote.total_display.is_none());
    }
}
