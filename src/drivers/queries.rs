//! Database queries for driver validation.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{DocumentRequirement, DriverRecord, LegacyDocument, UploadedDocument};

pub async fn find_driver(pool: &PgPool, driver_id: Uuid) -> Result<Option<DriverRecord>, AppError> {
    let driver = sqlx::query_as::<_, DriverRecord>(
        r#"
        SELECT
            id, country_code, state_code, rfc, rfc_validated,
            insurance_expiry::date AS insurance_expiry,
            semovi_constancia_expiry::date AS semovi_constancia_expiry,
            semovi_vehicular_expiry::date AS semovi_vehicular_expiry
        FROM drivers
        WHERE id = $1
        "#,
    )
    .bind(driver_id)
    .fetch_optional(pool)
    .await?;

    Ok(driver)
}

pub async fn update_rfc(pool: &PgPool, driver_id: Uuid, rfc: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE drivers SET rfc = $2, rfc_validated = true WHERE id = $1")
        .bind(driver_id)
        .bind(rfc)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn get_required_documents(
    pool: &PgPool,
    country_code: &str,
    state_code: Option<&str>,
) -> Result<Vec<DocumentRequirement>, AppError> {
    let requirements = sqlx::query_as::<_, DocumentRequirement>(
        r#"
        SELECT document_type, display_name, COALESCE(is_required, false) AS is_required
        FROM get_required_documents($1, $2)
        "#,
    )
    .bind(country_code)
    .bind(state_code)
    .fetch_all(pool)
    .await?;

    Ok(requirements)
}

pub async fn list_uploaded_documents(
    pool: &PgPool,
    driver_id: Uuid,
) -> Result<Vec<UploadedDocument>, AppError> {
    let docs = sqlx::query_as::<_, UploadedDocument>(
        r#"
        SELECT document_type, verification_status, expiry_date::date AS expiry_date
        FROM driver_documents_mx
        WHERE driver_id = $1
        "#,
    )
    .bind(driver_id)
    .fetch_all(pool)
    .await?;

    Ok(docs)
}

pub async fn list_legacy_documents(
    pool: &PgPool,
    driver_id: Uuid,
) -> Result<Vec<LegacyDocument>, AppError> {
    let docs = sqlx::query_as::<_, LegacyDocument>(
        r#"
        SELECT "type", status
        FROM documents
        WHERE driver_id = $1
        "#,
    )
    .bind(driver_id)
    .fetch_all(pool)
    .await?;

    Ok(docs)
}
