//! Driver validation service.

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::AppError;

use super::documents::{check_documents, DocumentCheck};
use super::models::ValidationResult;
use super::queries;
use super::requests::ValidateDriverRequest;
use super::responses::DriverValidationResponse;
use super::rfc::{normalize_rfc, validate_rfc};

/// RFC to check: the one sent with the request, else the one on file.
/// Blank values count as absent.
pub fn rfc_candidate<'a>(requested: Option<&'a str>, on_file: Option<&'a str>) -> Option<&'a str> {
    let present = |rfc: &&str| !rfc.trim().is_empty();
    requested.filter(present).or(on_file.filter(present))
}

/// Validate a driver's RFC and/or documents.
///
/// A valid RFC is saved on the driver (uppercased) and marked validated.
pub async fn validate_driver(
    pool: &PgPool,
    request: ValidateDriverRequest,
    today: NaiveDate,
) -> Result<DriverValidationResponse, AppError> {
    let driver_id = request
        .driver_id
        .ok_or_else(|| AppError::BadRequest("driver_id is required".to_string()))?;

    let driver = queries::find_driver(pool, driver_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;

    let mut validations = Vec::new();
    let mut rfc_validated = driver.rfc_validated.unwrap_or(false);

    if request.validation_type.checks_rfc() {
        match rfc_candidate(request.rfc.as_deref(), driver.rfc.as_deref()) {
            Some(rfc) => {
                let result = validate_rfc(rfc);
                if result.is_valid {
                    let normalized = normalize_rfc(rfc);
                    queries::update_rfc(pool, driver.id, &normalized).await?;
                    info!("RFC validated for driver {}", driver.id);
                    rfc_validated = true;
                }
                validations.push(result);
            }
            None => validations.push(ValidationResult::invalid("rfc", "RFC no proporcionado")),
        }
    }

    let mut documents = DocumentCheck::default();
    if request.validation_type.checks_documents() {
        let country = driver.country_code.as_deref().unwrap_or("MX");
        let requirements =
            queries::get_required_documents(pool, country, driver.state_code.as_deref()).await?;
        let uploaded = queries::list_uploaded_documents(pool, driver.id).await?;
        let legacy = queries::list_legacy_documents(pool, driver.id).await?;

        documents = check_documents(&driver, &requirements, &uploaded, &legacy, today);
        debug!(
            "Driver {}: {} missing, {} expiring",
            driver.id,
            documents.missing_documents.len(),
            documents.expiring_soon.len()
        );
    }

    validations.extend(documents.validations);

    Ok(DriverValidationResponse::new(
        validations,
        documents.missing_documents,
        documents.expiring_soon,
        rfc_validated,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc_candidate_prefers_request() {
        assert_eq!(
            rfc_candidate(Some("GODE561231GR8"), Some("ABC010203XY9")),
            Some("GODE561231GR8")
        );
    }

    #[test]
    fn test_blank_request_rfc_falls_back_to_stored() {
        assert_eq!(rfc_candidate(Some("   "), Some("ABC010203XY9")), Some("ABC010203XY9"));
        assert_eq!(rfc_candidate(Some(""), Some("ABC010203XY9")), Some("ABC010203XY9"));
        assert_eq!(rfc_candidate(None, Some("ABC010203XY9")), Some("ABC010203XY9"));
    }

    #[test]
    fn test_no_usable_rfc() {
        assert_eq!(rfc_candidate(Some(" "), Some("")), None);
        assert_eq!(rfc_candidate(None, None), None);
    }
}
