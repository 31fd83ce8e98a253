//! Request DTOs for pricing API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;

use super::calculators::{Coordinates, QuoteRequest};

/// Request to quote a ride or delivery
#[derive(Debug, Deserialize)]
pub struct PricingQuoteRequest {
    #[serde(default)]
    pub pickup_lat: Option<f64>,
    #[serde(default)]
    pub pickup_lng: Option<f64>,
    #[serde(default)]
    pub dropoff_lat: Option<f64>,
    #[serde(default)]
    pub dropoff_lng: Option<f64>,
    #[serde(default)]
    pub distance_km: Option<Decimal>,
    #[serde(default)]
    pub duration_min: Option<Decimal>,
    /// 'ride' | 'delivery' | 'carpool'
    #[serde(default = "default_service_type")]
    pub service_type: String,
    /// 'standard' | 'premium' | 'moto'
    #[serde(default = "default_vehicle_type")]
    pub vehicle_type: String,
    #[serde(default)]
    pub tolls: Option<Decimal>,
    #[serde(default)]
    pub display_currency: Option<String>,
    /// Price as if requested at this instant instead of now
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

fn default_service_type() -> String {
    "ride".to_string()
}

fn default_vehicle_type() -> String {
    "standard".to_string()
}

/// Validated quote input plus the keys used to resolve the zone
#[derive(Debug, Clone)]
pub struct TripQuote {
    pub request: QuoteRequest,
    pub service_type: String,
    pub vehicle_type: String,
}

impl PricingQuoteRequest {
    /// Check required fields and build the calculator input.
    ///
    /// Range checks (positive distance, non-negative tolls) are left to the
    /// calculator.
    pub fn into_trip_quote(self) -> Result<TripQuote, AppError> {
        let (Some(lat), Some(lng), Some(distance_km), Some(duration_min)) = (
            self.pickup_lat,
            self.pickup_lng,
            self.distance_km,
            self.duration_min,
        ) else {
            return Err(AppError::BadRequest(
                "pickup_lat, pickup_lng, distance_km, and duration_min are required".to_string(),
            ));
        };

        let dropoff = match (self.dropoff_lat, self.dropoff_lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };

        Ok(TripQuote {
            request: QuoteRequest {
                pickup: Coordinates { lat, lng },
                dropoff,
                distance_km,
                duration_min,
                tolls: self.tolls.unwrap_or(Decimal::ZERO),
                display_currency: self
                    .display_currency
                    .map(|c| c.trim().to_uppercase())
                    .filter(|c| !c.is_empty()),
            },
            service_type: self.service_type.to_lowercase(),
            vehicle_type: self.vehicle_type.to_lowercase(),
        })
    }
}
