//! Database models for CFDI invoicing.

use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// The issuing platform's fiscal identity (`cfdi_platform_config`)
#[derive(Debug, Clone, FromRow)]
pub struct PlatformConfig {
    pub emisor_rfc: String,
    pub emisor_nombre: String,
    pub emisor_regimen: String,
    pub lugar_expedicion: Option<String>,
    pub forma_pago: Option<String>,
    pub metodo_pago: Option<String>,
    pub pac_provider: Option<String>,
}

impl PlatformConfig {
    /// SAT payment form, transfer by default
    pub fn forma_pago(&self) -> &str {
        self.forma_pago.as_deref().unwrap_or("03")
    }

    /// SAT payment method, single payment by default
    pub fn metodo_pago(&self) -> &str {
        self.metodo_pago.as_deref().unwrap_or("PUE")
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RideCharge {
    pub id: Uuid,
    pub fare_subtotal: Option<Decimal>,
    pub fare: Option<Decimal>,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
}

impl RideCharge {
    /// Pre-tax amount: the fare breakdown subtotal when recorded, else the ride fare
    pub fn subtotal(&self) -> Decimal {
        self.fare_subtotal
            .filter(|v| !v.is_zero())
            .or(self.fare)
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DeliveryCharge {
    pub id: Uuid,
    pub final_price: Option<Decimal>,
    pub estimated_price: Option<Decimal>,
    pub pickup_address: Option<String>,
    pub destination_address: Option<String>,
}

impl DeliveryCharge {
    pub fn subtotal(&self) -> Decimal {
        self.final_price
            .filter(|v| !v.is_zero())
            .or(self.estimated_price)
            .unwrap_or(Decimal::ZERO)
    }
}
