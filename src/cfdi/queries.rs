//! Database queries for CFDI invoicing.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::builder::{InvoiceDraft, CFDI_IVA_RATE};
use super::models::{DeliveryCharge, PlatformConfig, RideCharge};
use super::pac::StampedInvoice;

pub async fn find_platform_config(pool: &PgPool) -> Result<Option<PlatformConfig>, AppError> {
    let config = sqlx::query_as::<_, PlatformConfig>(
        r#"
        SELECT
            emisor_rfc, emisor_nombre, emisor_regimen,
            lugar_expedicion, forma_pago, metodo_pago, pac_provider
        FROM cfdi_platform_config
        WHERE country_code = 'MX'
          AND is_active = true
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(config)
}

pub async fn find_ride_charge(pool: &PgPool, ride_id: Uuid) -> Result<Option<RideCharge>, AppError> {
    let ride = sqlx::query_as::<_, RideCharge>(
        r#"
        SELECT
            r.id,
            rf.subtotal::numeric AS fare_subtotal,
            r.fare::numeric AS fare,
            r.pickup_address,
            r.dropoff_address
        FROM rides r
        LEFT JOIN ride_fares rf ON rf.ride_id = r.id
        WHERE r.id = $1
        LIMIT 1
        "#,
    )
    .bind(ride_id)
    .fetch_optional(pool)
    .await?;

    Ok(ride)
}

pub async fn find_delivery_charge(
    pool: &PgPool,
    delivery_id: Uuid,
) -> Result<Option<DeliveryCharge>, AppError> {
    let delivery = sqlx::query_as::<_, DeliveryCharge>(
        r#"
        SELECT
            id,
            final_price::numeric AS final_price,
            estimated_price::numeric AS estimated_price,
            pickup_address,
            destination_address
        FROM package_deliveries
        WHERE id = $1
        "#,
    )
    .bind(delivery_id)
    .fetch_optional(pool)
    .await?;

    Ok(delivery)
}

/// Columns shared by failed and stamped invoice rows
pub struct InvoiceRecord<'a> {
    pub ride_id: Option<Uuid>,
    pub delivery_id: Option<Uuid>,
    pub rider_id: Uuid,
    pub platform: &'a PlatformConfig,
    pub draft: &'a InvoiceDraft,
    pub pac_provider: &'a str,
}

/// Outcome written to the row
pub enum InvoiceOutcome<'a> {
    Stamped(&'a StampedInvoice, DateTime<Utc>),
    Failed(&'a str),
}

pub async fn insert_invoice(
    pool: &PgPool,
    record: &InvoiceRecord<'_>,
    outcome: InvoiceOutcome<'_>,
) -> Result<Uuid, AppError> {
    let (status, uuid_fiscal, fecha_timbrado, xml_url, pdf_url, error_message) = match outcome {
        InvoiceOutcome::Stamped(stamped, at) => (
            "timbrado",
            Some(stamped.uuid.as_str()),
            Some(at),
            Some(stamped.xml_url.as_str()),
            Some(stamped.pdf_url.as_str()),
            None,
        ),
        InvoiceOutcome::Failed(message) => ("error", None, None, None, None, Some(message)),
    };

    let draft = record.draft;
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO cfdi_invoices (
            ride_id, delivery_id, rider_id,
            emisor_rfc, emisor_nombre, emisor_regimen,
            receptor_rfc, receptor_nombre, receptor_regimen,
            receptor_codigo_postal, receptor_uso_cfdi,
            uuid_fiscal, fecha_timbrado,
            subtotal, iva_rate, iva_amount, total, conceptos,
            xml_url, pdf_url, status, error_message, pac_provider
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
            $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23
        )
        RETURNING id
        "#,
    )
    .bind(record.ride_id)
    .bind(record.delivery_id)
    .bind(record.rider_id)
    .bind(&record.platform.emisor_rfc)
    .bind(&record.platform.emisor_nombre)
    .bind(&record.platform.emisor_regimen)
    .bind(&draft.receptor.rfc)
    .bind(&draft.receptor.nombre)
    .bind(&draft.receptor.regimen)
    .bind(&draft.receptor.codigo_postal)
    .bind(&draft.receptor.uso_cfdi)
    .bind(uuid_fiscal)
    .bind(fecha_timbrado)
    .bind(draft.subtotal)
    .bind(CFDI_IVA_RATE)
    .bind(draft.iva_amount)
    .bind(draft.total)
    .bind(Json(&draft.conceptos))
    .bind(xml_url)
    .bind(pdf_url)
    .bind(status)
    .bind(error_message)
    .bind(record.pac_provider)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Remember the rider's fiscal data for their next invoice
pub async fn update_rider_fiscal_profile(
    pool: &PgPool,
    rider_id: Uuid,
    rfc: &str,
    regimen: &str,
    codigo_postal: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE profiles SET rfc = $2, regimen_fiscal = $3, codigo_postal = $4 WHERE id = $1",
    )
    .bind(rider_id)
    .bind(rfc)
    .bind(regimen)
    .bind(codigo_postal)
    .execute(pool)
    .await?;

    Ok(())
}

