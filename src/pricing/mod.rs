//! Fare pricing for Mexican zones.
//!
//! `calculators` holds the pure quote math; `services` resolves the zone
//! configuration and display-currency rate around it.

pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod surge;

// Re-export commonly used items
pub use calculators::{compute_quote, round_money, QuoteError, QuoteRequest, QuoteResult};
pub use models::{PricingConfig, ZonePricing};
pub use routes::router;
pub use services::{
    quote_trip, CachedZoneResolver, PgZoneLookup, PgZonePricingResolver, ZoneLookup,
    ZonePricingResolver,
};
pub use surge::{FixedSurge, SurgeSource};
