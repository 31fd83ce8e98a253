//! Demand-based surge input.

use rust_decimal::Decimal;

use super::models::ZonePricing;

/// Supplies the raw surge multiplier for a zone.
///
/// The calculator caps whatever is returned here at the zone's
/// `max_surge_multiplier`.
pub trait SurgeSource: Send + Sync {
    fn surge_multiplier(&self, zone: &ZonePricing) -> Decimal;
}

/// Constant surge, used until demand tracking exists
#[derive(Debug, Clone, Copy)]
pub struct FixedSurge(pub Decimal);

impl Default for FixedSurge {
    fn default() -> Self {
        Self(Decimal::ONE)
    }
}

impl SurgeSource for FixedSurge {
    fn surge_multiplier(&self, _zone: &ZonePricing) -> Decimal {
        self.0
    }
}
