//! CFDI generation service.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::error::AppError;

use super::builder::{build_concepto, InvoiceDraft, ServiceKind};
use super::pac::PacRegistry;
use super::queries::{self, InvoiceOutcome, InvoiceRecord};
use super::requests::{GenerateCfdiRequest, InvoiceTarget, ValidatedCfdiRequest};
use super::responses::GenerateCfdiResponse;

fn not_found() -> AppError {
    AppError::NotFound("Transaction not found or has no amount".to_string())
}

/// Load the invoiced trip and build its single concept
async fn build_draft(pool: &PgPool, request: &ValidatedCfdiRequest) -> Result<InvoiceDraft, AppError> {
    let concepto = match request.target {
        InvoiceTarget::Ride(ride_id) => {
            let ride = queries::find_ride_charge(pool, ride_id).await?.ok_or_else(not_found)?;
            build_concepto(
                ServiceKind::Ride,
                &ride.id.to_string(),
                ride.subtotal(),
                ride.pickup_address.as_deref().unwrap_or_default(),
                ride.dropoff_address.as_deref().unwrap_or_default(),
            )
        }
        InvoiceTarget::Delivery(delivery_id) => {
            let delivery = queries::find_delivery_charge(pool, delivery_id)
                .await?
                .ok_or_else(not_found)?;
            build_concepto(
                ServiceKind::Delivery,
                &delivery.id.to_string(),
                delivery.subtotal(),
                delivery.pickup_address.as_deref().unwrap_or_default(),
                delivery.destination_address.as_deref().unwrap_or_default(),
            )
        }
        InvoiceTarget::Missing => return Err(not_found()),
    };

    if concepto.importe <= Decimal::ZERO {
        return Err(not_found());
    }

    Ok(InvoiceDraft::new(request.receptor.clone(), concepto))
}

/// Stamp an invoice for a ride or delivery and record the attempt.
///
/// Failed stamps are stored with status `error`; successful ones as `timbrado`,
/// after which the rider's fiscal profile is updated.
pub async fn generate_cfdi(
    pool: &PgPool,
    pacs: &PacRegistry,
    request: GenerateCfdiRequest,
) -> Result<GenerateCfdiResponse, AppError> {
    let request = request
        .validate()
        .ok_or_else(|| AppError::BadRequest("Missing required fields".to_string()))?;

    let platform = queries::find_platform_config(pool)
        .await?
        .ok_or_else(|| AppError::Internal("CFDI platform not configured".to_string()))?;

    let draft = build_draft(pool, &request).await?;

    let pac = pacs.for_provider(platform.pac_provider.as_deref());
    let (ride_id, delivery_id) = match request.target {
        InvoiceTarget::Ride(id) => (Some(id), None),
        InvoiceTarget::Delivery(id) => (None, Some(id)),
        InvoiceTarget::Missing => (None, None),
    };
    let record = InvoiceRecord {
        ride_id,
        delivery_id,
        rider_id: request.rider_id,
        platform: &platform,
        draft: &draft,
        pac_provider: pac.provider(),
    };

    let stamped = match pac.stamp(&platform, &draft).await {
        Ok(stamped) => stamped,
        Err(e) => {
            let message = e.to_string();
            warn!("PAC {} rejected invoice: {}", pac.provider(), message);
            queries::insert_invoice(pool, &record, InvoiceOutcome::Failed(&message)).await?;
            return Err(AppError::Upstream(message));
        }
    };

    // The invoice is already stamped; a failed insert must not hide that from the caller
    let invoice_id =
        match queries::insert_invoice(pool, &record, InvoiceOutcome::Stamped(&stamped, Utc::now()))
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                error!("Error saving invoice {}: {}", stamped.uuid, e);
                None
            }
        };

    if let Err(e) = queries::update_rider_fiscal_profile(
        pool,
        request.rider_id,
        &draft.receptor.rfc,
        &draft.receptor.regimen,
        &draft.receptor.codigo_postal,
    )
    .await
    {
        warn!("Failed to update fiscal profile for rider {}: {}", request.rider_id, e);
    }

    info!("CFDI {} stamped via {} total {}", stamped.uuid, pac.provider(), draft.total);

    Ok(GenerateCfdiResponse {
        invoice_id,
        uuid_fiscal: stamped.uuid,
        xml_url: stamped.xml_url,
        pdf_url: stamped.pdf_url,
        total: draft.total,
    })
}
