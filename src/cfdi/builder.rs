//! CFDI 4.0 concept and amount building.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::pricing::calculators::round2;

/// IVA transferred on passenger and courier services
pub const CFDI_IVA_RATE: Decimal = dec!(0.16);

/// SAT product keys
pub const CLAVE_TAXI: &str = "78101802";
pub const CLAVE_MENSAJERIA: &str = "78102200";

/// IVA transfer on one concept
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Traslado {
    #[serde(with = "rust_decimal::serde::float")]
    pub base: Decimal,
    pub impuesto: String,
    pub tipo_factor: String,
    #[serde(rename = "TasaOCuota", with = "rust_decimal::serde::float")]
    pub tasa_o_cuota: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub importe: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Impuestos {
    pub traslados: Vec<Traslado>,
}

/// One invoice line, stored as-is in `cfdi_invoices.conceptos`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Concepto {
    pub clave_prod_serv: String,
    pub no_identificacion: String,
    pub cantidad: u32,
    pub clave_unidad: String,
    pub unidad: String,
    pub descripcion: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub valor_unitario: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub importe: Decimal,
    pub objeto_imp: String,
    pub impuestos: Impuestos,
}

impl Concepto {
    /// Importe plus transferred taxes
    pub fn total(&self) -> Decimal {
        self.importe + self.impuestos.traslados.iter().map(|t| t.importe).sum::<Decimal>()
    }
}

/// What is being invoiced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Ride,
    Delivery,
}

impl ServiceKind {
    fn clave_prod_serv(self) -> &'static str {
        match self {
            ServiceKind::Ride => CLAVE_TAXI,
            ServiceKind::Delivery => CLAVE_MENSAJERIA,
        }
    }

    fn description(self, from: &str, to: &str) -> String {
        match self {
            ServiceKind::Ride => format!("Servicio de transporte privado - {} a {}", from, to),
            ServiceKind::Delivery => format!("Servicio de entrega - {} a {}", from, to),
        }
    }
}

pub fn iva_for(subtotal: Decimal) -> Decimal {
    round2(subtotal * CFDI_IVA_RATE)
}

/// Single service line with one IVA transfer
pub fn build_concepto(
    kind: ServiceKind,
    identificacion: &str,
    subtotal: Decimal,
    from: &str,
    to: &str,
) -> Concepto {
    Concepto {
        clave_prod_serv: kind.clave_prod_serv().to_string(),
        no_identificacion: identificacion.to_string(),
        cantidad: 1,
        clave_unidad: "E48".to_string(),
        unidad: "Servicio".to_string(),
        descripcion: kind.description(from, to),
        valor_unitario: subtotal,
        importe: subtotal,
        objeto_imp: "02".to_string(),
        impuestos: Impuestos {
            traslados: vec![Traslado {
                base: subtotal,
                impuesto: "002".to_string(),
                tipo_factor: "Tasa".to_string(),
                tasa_o_cuota: CFDI_IVA_RATE,
                importe: iva_for(subtotal),
            }],
        },
    }
}

/// Invoice receiver (the rider)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receptor {
    #[serde(rename = "Rfc")]
    pub rfc: String,
    #[serde(rename = "Nombre")]
    pub nombre: String,
    #[serde(rename = "RegimenFiscalReceptor")]
    pub regimen: String,
    #[serde(rename = "DomicilioFiscalReceptor")]
    pub codigo_postal: String,
    #[serde(rename = "UsoCFDI")]
    pub uso_cfdi: String,
}

/// Everything a PAC needs to stamp an invoice
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub receptor: Receptor,
    pub conceptos: Vec<Concepto>,
    pub subtotal: Decimal,
    pub iva_amount: Decimal,
    pub total: Decimal,
}

impl InvoiceDraft {
    pub fn new(receptor: Receptor, concepto: Concepto) -> Self {
        let subtotal = concepto.importe;
        let iva_amount = iva_for(subtotal);

        Self {
            receptor,
            conceptos: vec![concepto],
            subtotal,
            iva_amount,
            total: subtotal + iva_amount,
        }
    }
}
