//! Response DTOs for FX endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A rate stored during a refresh
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedRate {
    pub base: String,
    pub quote: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
}

/// Response for `POST /fx/refresh`
#[derive(Debug, Serialize)]
pub struct FxRefreshResponse {
    pub rates_updated: usize,
    pub rates: Vec<UpdatedRate>,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// Response for `GET /fx/rates/:base/:quote`
#[derive(Debug, Serialize)]
pub struct LatestRateResponse {
    pub base: String,
    pub quote: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
}
