//! Toro pricing service: fare quotes, exchange rates, driver tax retention,
//! driver validation and CFDI invoicing for the Mexican market.

pub mod cache;
pub mod cfdi;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fx;
pub mod pricing;
pub mod responses;
pub mod routes;
pub mod tax;

use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::AppCache;
use crate::cfdi::PacRegistry;
use crate::config::AppConfig;
use crate::fx::{RateSource, RateStore};
use crate::pricing::{SurgeSource, ZonePricingResolver};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub config: Arc<AppConfig>,
    pub zone_resolver: Arc<dyn ZonePricingResolver>,
    pub rate_store: Arc<dyn RateStore>,
    pub rate_source: Arc<dyn RateSource>,
    pub surge: Arc<dyn SurgeSource>,
    pub pacs: PacRegistry,
}
