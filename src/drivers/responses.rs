//! Response DTOs for driver validation.

use serde::Serialize;

use super::models::ValidationResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverValidationResponse {
    pub is_complete: bool,
    pub validations: Vec<ValidationResult>,
    pub missing_documents: Vec<String>,
    pub expiring_soon: Vec<String>,
    pub rfc_validated: bool,
}

impl DriverValidationResponse {
    /// Complete means nothing missing, every check passed and the RFC is validated
    pub fn new(
        validations: Vec<ValidationResult>,
        missing_documents: Vec<String>,
        expiring_soon: Vec<String>,
        rfc_validated: bool,
    ) -> Self {
        let is_complete = missing_documents.is_empty()
            && validations.iter().all(|v| v.is_valid)
            && rfc_validated;

        Self {
            is_complete,
            validations,
            missing_documents,
            expiring_soon,
            rfc_validated,
        }
    }
}
