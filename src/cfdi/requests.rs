//! Request DTOs for CFDI invoicing.

use serde::Deserialize;
use uuid::Uuid;

use super::builder::Receptor;

/// Uso CFDI when the rider does not pick one: gastos en general
pub const DEFAULT_USO_CFDI: &str = "G03";

#[derive(Debug, Deserialize)]
pub struct GenerateCfdiRequest {
    #[serde(default)]
    pub ride_id: Option<Uuid>,
    #[serde(default)]
    pub delivery_id: Option<Uuid>,
    #[serde(default)]
    pub rider_id: Option<Uuid>,
    #[serde(default)]
    pub receptor_rfc: Option<String>,
    #[serde(default)]
    pub receptor_nombre: Option<String>,
    #[serde(default)]
    pub receptor_regimen: Option<String>,
    #[serde(default)]
    pub receptor_codigo_postal: Option<String>,
    #[serde(default)]
    pub receptor_uso_cfdi: Option<String>,
}

/// The trip being invoiced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceTarget {
    Ride(Uuid),
    Delivery(Uuid),
    Missing,
}

#[derive(Debug, Clone)]
pub struct ValidatedCfdiRequest {
    pub rider_id: Uuid,
    pub target: InvoiceTarget,
    pub receptor: Receptor,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GenerateCfdiRequest {
    /// Rider, RFC, regimen and postal code are mandatory; the RFC is uppercased
    pub fn validate(self) -> Option<ValidatedCfdiRequest> {
        let rider_id = self.rider_id?;
        let rfc = non_empty(self.receptor_rfc)?.to_uppercase();
        let regimen = non_empty(self.receptor_regimen)?;
        let codigo_postal = non_empty(self.receptor_codigo_postal)?;

        // A ride takes precedence when both ids are sent
        let target = match (self.ride_id, self.delivery_id) {
            (Some(ride_id), _) => InvoiceTarget::Ride(ride_id),
            (None, Some(delivery_id)) => InvoiceTarget::Delivery(delivery_id),
            (None, None) => InvoiceTarget::Missing,
        };

        Some(ValidatedCfdiRequest {
            rider_id,
            target,
            receptor: Receptor {
                rfc,
                nombre: non_empty(self.receptor_nombre).unwrap_or_default(),
                regimen,
                codigo_postal,
                uso_cfdi: non_empty(self.receptor_uso_cfdi)
                    .unwrap_or_else(|| DEFAULT_USO_CFDI.to_string()),
            },
        })
    }
}
