//! In-memory caching using moka
//!
//! Zone pricing rarely changes and is looked up on every quote, so it is kept
//! for a few minutes. FX rates are cached until the next refresh invalidates them.

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::pricing::calculators::Coordinates;
use crate::pricing::models::ZonePricing;

/// Application cache holding resolved zone pricing and latest FX rates
#[derive(Clone)]
pub struct AppCache {
    /// Zone pricing (zone_key -> ZonePricing)
    pub zone_pricing: Cache<String, Arc<ZonePricing>>,
    /// Latest FX rate per pair (fx_key -> rate)
    pub fx_rates: Cache<String, Decimal>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Zone pricing: 1000 pickup cells, 5 min TTL
            zone_pricing: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(5 * 60))
                .build(),

            // FX rates: a handful of pairs, 15 min TTL
            fx_rates: Cache::builder()
                .max_capacity(32)
                .time_to_live(Duration::from_secs(15 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            zone_pricing_size: self.zone_pricing.entry_count(),
            fx_rates_size: self.fx_rates.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.zone_pricing.invalidate_all();
        self.fx_rates.invalidate_all();
        info!("All caches invalidated");
    }

    /// Drop cached FX rates after new ones were stored
    pub fn invalidate_fx_rates(&self) {
        self.fx_rates.invalidate_all();
        info!("FX rate cache invalidated");
    }

    /// Cache key for an exact pickup point; nearby points may lie in different zones
    pub fn zone_key(pickup: Coordinates, service_type: &str, vehicle_type: &str) -> String {
        format!(
            "zone:{}:{}:{}:{}",
            service_type, vehicle_type, pickup.lat, pickup.lng
        )
    }

    /// Cache key for a currency pair
    pub fn fx_key(base: &str, quote: &str) -> String {
        format!("fx:{}:{}", base, quote)
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub zone_pricing_size: u64,
    pub fx_rates_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zone_key_keeps_nearby_points_apart() {
        let a = Coordinates { lat: 19.43261, lng: -99.13321 };
        let b = Coordinates { lat: 19.43249, lng: -99.13318 };
        assert_ne!(
            AppCache::zone_key(a, "ride", "standard"),
            AppCache::zone_key(b, "ride", "standard")
        );
        assert_eq!(
            AppCache::zone_key(a, "ride", "standard"),
            AppCache::zone_key(Coordinates { lat: 19.43261, lng: -99.13321 }, "ride", "standard")
        );
        assert_ne!(
            AppCache::zone_key(a, "ride", "standard"),
            AppCache::zone_key(a, "delivery", "moto")
        );
    }

    #[tokio::test]
    async fn test_invalidate_fx_rates_keeps_zones() {
        let cache = AppCache::new();
        let key = AppCache::zone_key(Coordinates { lat: 1.0, lng: 2.0 }, "ride", "standard");
        cache.zone_pricing.insert(key.clone(), Arc::new(ZonePricing::fallback())).await;
        cache.fx_rates.insert(AppCache::fx_key("MXN", "USD"), dec!(0.055)).await;

        cache.invalidate_fx_rates();

        assert!(cache.fx_rates.get(&AppCache::fx_key("MXN", "USD")).await.is_none());
        assert!(cache.zone_pricing.get(&key).await.is_some());
    }
}
