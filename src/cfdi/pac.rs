//! PAC (Proveedor Autorizado de Certificación) clients that stamp invoices.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::FacturamaConfig;

use super::builder::{Concepto, InvoiceDraft, Receptor};
use super::models::PlatformConfig;

const FACTURAMA_SANDBOX_URL: &str = "https://apisandbox.facturama.mx";
const FACTURAMA_PRODUCTION_URL: &str = "https://api.facturama.mx";

#[derive(Debug, thiserror::Error)]
pub enum PacError {
    #[error("{0} credentials not configured")]
    NotConfigured(&'static str),

    #[error("Facturama error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Facturama error: {0}")]
    Rejected(String),
}

/// A stamped (timbrado) invoice
#[derive(Debug, Clone, PartialEq)]
pub struct StampedInvoice {
    pub uuid: String,
    pub xml_url: String,
    pub pdf_url: String,
}

#[async_trait]
pub trait PacClient: Send + Sync {
    /// Name stored in `cfdi_invoices.pac_provider`
    fn provider(&self) -> &'static str;

    async fn stamp(
        &self,
        platform: &PlatformConfig,
        draft: &InvoiceDraft,
    ) -> Result<StampedInvoice, PacError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FacturamaTax {
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
    name: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    base: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    rate: Decimal,
    is_retention: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FacturamaItem {
    product_code: String,
    identification_number: String,
    description: String,
    unit: String,
    unit_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    unit_price: Decimal,
    quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    subtotal: Decimal,
    tax_object: String,
    taxes: Vec<FacturamaTax>,
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
}

impl From<&Concepto> for FacturamaItem {
    fn from(c: &Concepto) -> Self {
        Self {
            product_code: c.clave_prod_serv.clone(),
            identification_number: c.no_identificacion.clone(),
            description: c.descripcion.clone(),
            unit: c.unidad.clone(),
            unit_code: c.clave_unidad.clone(),
            unit_price: c.valor_unitario,
            quantity: c.cantidad,
            subtotal: c.importe,
            tax_object: c.objeto_imp.clone(),
            taxes: c
                .impuestos
                .traslados
                .iter()
                .map(|t| FacturamaTax {
                    total: t.importe,
                    name: "IVA",
                    base: t.base,
                    rate: t.tasa_o_cuota,
                    is_retention: false,
                })
                .collect(),
            total: c.total(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FacturamaCfdiRequest<'a> {
    serie: &'static str,
    currency: &'static str,
    expedition_place: Option<&'a str>,
    payment_conditions: &'static str,
    folio: String,
    cfdi_type: &'static str,
    payment_form: &'a str,
    payment_method: &'a str,
    receiver: &'a Receptor,
    items: Vec<FacturamaItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FacturamaCfdiResponse {
    id: String,
    complement: Option<FacturamaComplement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FacturamaComplement {
    tax_stamp: Option<FacturamaTaxStamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FacturamaTaxStamp {
    uuid: Option<String>,
}

/// Facturama API v3 over HTTP basic auth
#[derive(Debug, Clone)]
pub struct FacturamaClient {
    http: reqwest::Client,
    config: FacturamaConfig,
}

impl FacturamaClient {
    pub fn new(http: reqwest::Client, config: FacturamaConfig) -> Self {
        Self { http, config }
    }

    fn base_url(&self) -> &'static str {
        if self.config.sandbox {
            FACTURAMA_SANDBOX_URL
        } else {
            FACTURAMA_PRODUCTION_URL
        }
    }

    fn request_body<'a>(
        platform: &'a PlatformConfig,
        draft: &'a InvoiceDraft,
        folio: String,
    ) -> FacturamaCfdiRequest<'a> {
        FacturamaCfdiRequest {
            serie: "T",
            currency: "MXN",
            expedition_place: platform.lugar_expedicion.as_deref(),
            payment_conditions: "CONTADO",
            folio,
            cfdi_type: "I",
            payment_form: platform.forma_pago(),
            payment_method: platform.metodo_pago(),
            receiver: &draft.receptor,
            items: draft.conceptos.iter().map(FacturamaItem::from).collect(),
        }
    }
}

#[async_trait]
impl PacClient for FacturamaClient {
    fn provider(&self) -> &'static str {
        "facturama"
    }

    #[tracing::instrument(skip_all)]
    async fn stamp(
        &self,
        platform: &PlatformConfig,
        draft: &InvoiceDraft,
    ) -> Result<StampedInvoice, PacError> {
        let (Some(user), Some(password)) = (&self.config.user, &self.config.password) else {
            return Err(PacError::NotConfigured("Facturama"));
        };

        let folio = Utc::now().timestamp_millis().to_string();
        let body = Self::request_body(platform, draft, folio);

        let res = self
            .http
            .post(format!("{}/3/cfdis", self.base_url()))
            .basic_auth(user, Some(password))
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(PacError::Rejected(text));
        }

        let result: FacturamaCfdiResponse = res.json().await?;
        let uuid = result
            .complement
            .and_then(|c| c.tax_stamp)
            .and_then(|t| t.uuid)
            .ok_or_else(|| PacError::Rejected("response has no TaxStamp UUID".to_string()))?;

        Ok(StampedInvoice {
            uuid,
            xml_url: format!("{}/cfdi/xml/{}", self.base_url(), result.id),
            pdf_url: format!("{}/cfdi/pdf/{}", self.base_url(), result.id),
        })
    }
}

/// Development stand-in: stamps everything with a `MOCK-` UUID
#[derive(Debug, Clone, Default)]
pub struct SandboxPac;

#[async_trait]
impl PacClient for SandboxPac {
    fn provider(&self) -> &'static str {
        "sandbox"
    }

    async fn stamp(
        &self,
        _platform: &PlatformConfig,
        _draft: &InvoiceDraft,
    ) -> Result<StampedInvoice, PacError> {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();

        Ok(StampedInvoice {
            uuid: format!("MOCK-{}-{}", millis, &suffix[..9]).to_uppercase(),
            xml_url: format!("https://storage.example.com/cfdi/{}.xml", millis),
            pdf_url: format!("https://storage.example.com/cfdi/{}.pdf", millis),
        })
    }
}

/// PAC clients by provider name
#[derive(Clone)]
pub struct PacRegistry {
    facturama: Arc<dyn PacClient>,
    sandbox: Arc<dyn PacClient>,
}

impl PacRegistry {
    pub fn new(facturama: Arc<dyn PacClient>, sandbox: Arc<dyn PacClient>) -> Self {
        Self { facturama, sandbox }
    }

    /// `facturama` selects the real PAC; anything else stamps in sandbox
    pub fn for_provider(&self, provider: Option<&str>) -> Arc<dyn PacClient> {
        match provider {
            Some("facturama") => self.facturama.clone(),
            _ => self.sandbox.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfdi::builder::{build_concepto, ServiceKind};
    use rust_decimal_macros::dec;

    fn platform(provider: Option<&str>) -> PlatformConfig {
        PlatformConfig {
            emisor_rfc: "TOR210101AB1".to_string(),
            emisor_nombre: "Toro Movilidad".to_string(),
            emisor_regimen: "601".to_string(),
            lugar_expedicion: Some("06600".to_string()),
            forma_pago: None,
            metodo_pago: None,
            pac_provider: provider.map(str::to_string),
        }
    }

    fn draft() -> InvoiceDraft {
        let receptor = Receptor {
            rfc: "GODE561231GR8".to_string(),
            nombre: "Eduardo Gomez".to_string(),
            regimen: "612".to_string(),
            codigo_postal: "06600".to_string(),
            uso_cfdi: "G03".to_string(),
        };
        InvoiceDraft::new(
            receptor,
            build_concepto(ServiceKind::Ride, "ride-1", dec!(100), "A", "B"),
        )
    }

    fn facturama(user: Option<&str>, sandbox: bool) -> FacturamaClient {
        FacturamaClient::new(
            reqwest::Client::new(),
            FacturamaConfig {
                user: user.map(str::to_string),
                password: user.map(|_| "secret".to_string()),
                sandbox,
            },
        )
    }

    #[tokio::test]
    async fn test_sandbox_stamps_mock_uuid() {
        let stamped = SandboxPac.stamp(&platform(None), &draft()).await.unwrap();
        assert!(stamped.uuid.starts_with("MOCK-"));
        assert_eq!(stamped.uuid, stamped.uuid.to_uppercase());
        assert!(stamped.xml_url.ends_with(".xml"));
        assert!(stamped.pdf_url.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_facturama_without_credentials() {
        let err = facturama(None, true)
            .stamp(&platform(Some("facturama")), &draft())
            .await
            .unwrap_err();
        assert!(matches!(err, PacError::NotConfigured(_)));
        assert_eq!(err.to_string(), "Facturama credentials not configured");
    }

    #[test]
    fn test_facturama_base_url() {
        assert_eq!(facturama(Some("u"), true).base_url(), FACTURAMA_SANDBOX_URL);
        assert_eq!(facturama(Some("u"), false).base_url(), FACTURAMA_PRODUCTION_URL);
    }

    #[test]
    fn test_facturama_request_body() {
        let platform = platform(Some("facturama"));
        let draft = draft();
        let body = FacturamaClient::request_body(&platform, &draft, "1700000000000".to_string());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["Serie"], "T");
        assert_eq!(json["CfdiType"], "I");
        assert_eq!(json["PaymentForm"], "03");
        assert_eq!(json["PaymentMethod"], "PUE");
        assert_eq!(json["ExpeditionPlace"], "06600");
        assert_eq!(json["Receiver"]["Rfc"], "GODE561231GR8");
        assert_eq!(json["Items"][0]["ProductCode"], "78101802");
        assert_eq!(json["Items"][0]["Taxes"][0]["Name"], "IVA");
        assert_eq!(json["Items"][0]["Taxes"][0]["IsRetention"], false);
        assert_eq!(json["Items"][0]["Total"], 116.0);
    }

    #[test]
    fn test_registry_selects_provider() {
        let registry = PacRegistry::new(Arc::new(facturama(None, true)), Arc::new(SandboxPac));
        assert_eq!(registry.for_provider(Some("facturama")).provider(), "facturama");
        assert_eq!(registry.for_provider(Some("sw_sapien")).provider(), "sandbox");
        assert_eq!(registry.for_provider(None).provider(), "sandbox");
    }
}
