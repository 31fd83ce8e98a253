//! Pricing service functions with database access.
//!
//! Zone resolution and FX lookups happen here, around the pure calculator.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::AppCache;
use crate::error::AppError;
use crate::fx::RateStore;

use super::calculators::{compute_quote, Coordinates, QuoteError, QuoteResult};
use super::models::ZonePricing;
use super::queries;
use super::requests::TripQuote;
use super::surge::SurgeSource;

impl From<QuoteError> for AppError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::InvalidInput(msg) => AppError::BadRequest(msg),
        }
    }
}

/// Resolves the pricing configuration for a pickup point.
///
/// `Ok(None)` means no zone matched; callers substitute [`ZonePricing::fallback`].
#[async_trait]
pub trait ZonePricingResolver: Send + Sync {
    async fn resolve(
        &self,
        pickup: Coordinates,
        service_type: &str,
        vehicle_type: &str,
    ) -> Result<Option<ZonePricing>, AppError>;
}

/// The two database sources behind zone resolution
#[async_trait]
pub trait ZoneLookup: Send + Sync {
    /// Zone polygon containing the pickup
    async fn spatial(
        &self,
        pickup: Coordinates,
        service_type: &str,
        vehicle_type: &str,
    ) -> Result<Option<ZonePricing>, AppError>;

    /// State-level `pricing_config` row
    async fn state(&self, service_type: &str) -> Result<Option<ZonePricing>, AppError>;
}

#[derive(Clone)]
pub struct PgZoneLookup {
    pool: PgPool,
}

#[async_trait]
impl ZoneLookup for PgZoneLookup {
    async fn spatial(
        &self,
        pickup: Coordinates,
        service_type: &str,
        vehicle_type: &str,
    ) -> Result<Option<ZonePricing>, AppError> {
        queries::find_zone_pricing(&self.pool, pickup.lat, pickup.lng, service_type, vehicle_type)
            .await
    }

    async fn state(&self, service_type: &str) -> Result<Option<ZonePricing>, AppError> {
        Ok(queries::find_state_pricing(&self.pool, service_type)
            .await?
            .map(ZonePricing::from))
    }
}

/// Spatial zone lookup with a state-level fallback, cached per pickup point
#[derive(Clone)]
pub struct CachedZoneResolver<L> {
    lookup: L,
    cache: AppCache,
}

pub type PgZonePricingResolver = CachedZoneResolver<PgZoneLookup>;

impl PgZonePricingResolver {
    pub fn new(pool: PgPool, cache: AppCache) -> Self {
        Self::with_lookup(PgZoneLookup { pool }, cache)
    }
}

impl<L: ZoneLookup> CachedZoneResolver<L> {
    pub fn with_lookup(lookup: L, cache: AppCache) -> Self {
        Self { lookup, cache }
    }
}

#[async_trait]
impl<L: ZoneLookup> ZonePricingResolver for CachedZoneResolver<L> {
    async fn resolve(
        &self,
        pickup: Coordinates,
        service_type: &str,
        vehicle_type: &str,
    ) -> Result<Option<ZonePricing>, AppError> {
        let cache_key = AppCache::zone_key(pickup, service_type, vehicle_type);
        if let Some(cached) = self.cache.zone_pricing.get(&cache_key).await {
            debug!("Cache HIT for zone pricing: {}", cache_key);
            return Ok(Some((*cached).clone()));
        }

        // Lookup failures degrade to the next source rather than failing the quote
        let (zone, cacheable) = match self.lookup.spatial(pickup, service_type, vehicle_type).await {
            Ok(Some(zone)) => (Some(zone), true),
            Ok(None) => (self.state_fallback(service_type).await, true),
            Err(e) => {
                warn!("Spatial pricing lookup failed: {}", e);
                (self.state_fallback(service_type).await, false)
            }
        };

        // After a failed spatial lookup the answer is not cached
        if let Some(zone) = zone.as_ref().filter(|_| cacheable) {
            self.cache
                .zone_pricing
                .insert(cache_key, Arc::new(zone.clone()))
                .await;
        }

        Ok(zone)
    }
}

impl<L: ZoneLookup> CachedZoneResolver<L> {
    async fn state_fallback(&self, service_type: &str) -> Option<ZonePricing> {
        match self.lookup.state(service_type).await {
            Ok(zone) => zone,
            Err(e) => {
                warn!("pricing_config fallback query failed: {}", e);
                None
            }
        }
    }
}

/// A quote together with the zone that priced it
#[derive(Debug, Clone)]
pub struct PricedTrip {
    pub zone: ZonePricing,
    pub quote: QuoteResult,
}

/// Price a trip end to end.
///
/// # Arguments
/// * `resolver` - Zone pricing lookup
/// * `rates` - FX rate store, only consulted for a foreign display currency
/// * `surge` - Surge input provider
/// * `trip` - Validated request
/// * `now_local` - Wall-clock time in the pickup zone
pub async fn quote_trip(
    resolver: &dyn ZonePricingResolver,
    rates: &dyn RateStore,
    surge: &dyn SurgeSource,
    trip: &TripQuote,
    now_local: NaiveDateTime,
) -> Result<PricedTrip, AppError> {
    let zone = resolver
        .resolve(trip.request.pickup, &trip.service_type, &trip.vehicle_type)
        .await?
        .unwrap_or_else(|| {
            info!(
                "No pricing zone for {:?} ({}/{}), using defaults",
                trip.request.pickup, trip.service_type, trip.vehicle_type
            );
            ZonePricing::fallback()
        });

    let surge_input = surge.surge_multiplier(&zone);
    let mut quote = compute_quote(&trip.request, &zone.config, now_local, surge_input)?;

    if let Some(display_currency) = &trip.request.display_currency {
        if quote.needs_conversion(display_currency) {
            let rate = match rates.latest_rate(&quote.currency, display_currency).await {
                Ok(rate) => rate,
                Err(e) => {
                    warn!("FX lookup {}/{} failed: {}", quote.currency, display_currency, e);
                    None
                }
            };
            if rate.is_none() {
                debug!("No FX rate for {}/{}", quote.currency, display_currency);
            }
            quote = quote.with_display_currency(display_currency, rate);
        }
    }

    Ok(PricedTrip { zone, quote })
}
