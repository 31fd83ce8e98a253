//! Database models for driver validation.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One check reported back to the driver app
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub field: String,
    pub message: String,
}

impl ValidationResult {
    pub fn valid(field: &str, message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Driver columns used by validation
#[derive(Debug, Clone, FromRow)]
pub struct DriverRecord {
    pub id: Uuid,
    pub country_code: Option<String>,
    pub state_code: Option<String>,
    pub rfc: Option<String>,
    pub rfc_validated: Option<bool>,
    pub insurance_expiry: Option<NaiveDate>,
    pub semovi_constancia_expiry: Option<NaiveDate>,
    pub semovi_vehicular_expiry: Option<NaiveDate>,
}

/// Row of `get_required_documents(country, state)`
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRequirement {
    pub document_type: String,
    pub display_name: String,
    pub is_required: bool,
}

/// Row of `driver_documents_mx`
#[derive(Debug, Clone, FromRow)]
pub struct UploadedDocument {
    pub document_type: String,
    pub verification_status: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Row of the older `documents` table
#[derive(Debug, Clone, FromRow)]
pub struct LegacyDocument {
    #[sqlx(rename = "type")]
    pub doc_type: String,
    pub status: Option<String>,
}
