//! Response DTOs for CFDI invoicing.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct GenerateCfdiResponse {
    /// None when the PAC stamped the invoice but saving the row failed
    pub invoice_id: Option<Uuid>,
    pub uuid_fiscal: String,
    pub xml_url: String,
    pub pdf_url: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}
