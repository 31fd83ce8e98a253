//! Document completeness and expiry checks.

use chrono::{Days, NaiveDate};
use std::collections::HashSet;

use super::models::{
    DocumentRequirement, DriverRecord, LegacyDocument, UploadedDocument, ValidationResult,
};

/// Days ahead of expiry at which a document is flagged
pub const EXPIRY_WARNING_DAYS: u64 = 30;

/// State whose drivers also need SEMOVI constancias
const CDMX: &str = "CDMX";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentCheck {
    pub validations: Vec<ValidationResult>,
    pub missing_documents: Vec<String>,
    pub expiring_soon: Vec<String>,
}

impl DocumentCheck {
    fn missing(&mut self, field: &str, message: String) {
        self.validations.push(ValidationResult::invalid(field, message));
        self.missing_documents.push(field.to_string());
    }

    fn expiring(&mut self, field: &str, message: String) {
        self.validations.push(ValidationResult::valid(field, message));
        self.expiring_soon.push(field.to_string());
    }
}

fn approved_types<'a>(
    uploaded: &'a [UploadedDocument],
    legacy: &'a [LegacyDocument],
) -> HashSet<&'a str> {
    let is_approved = |status: &Option<String>| status.as_deref() == Some("approved");

    uploaded
        .iter()
        .filter(|d| is_approved(&d.verification_status))
        .map(|d| d.document_type.as_str())
        .chain(
            legacy
                .iter()
                .filter(|d| is_approved(&d.status))
                .map(|d| d.doc_type.as_str()),
        )
        .collect()
}

/// Check a driver's documents against the requirements for their state.
///
/// A date on or before `today` counts as expired.
pub fn check_documents(
    driver: &DriverRecord,
    requirements: &[DocumentRequirement],
    uploaded: &[UploadedDocument],
    legacy: &[LegacyDocument],
    today: NaiveDate,
) -> DocumentCheck {
    let mut check = DocumentCheck::default();
    let warn_until = today
        .checked_add_days(Days::new(EXPIRY_WARNING_DAYS))
        .unwrap_or(NaiveDate::MAX);

    let approved = approved_types(uploaded, legacy);
    for req in requirements.iter().filter(|r| r.is_required) {
        if !approved.contains(req.document_type.as_str()) {
            check.missing(&req.document_type, format!("{} es requerido", req.display_name));
        }
    }

    for doc in uploaded {
        if let Some(expiry) = doc.expiry_date {
            if expiry <= warn_until {
                check.expiring(
                    &doc.document_type,
                    format!("{} vence el {}", doc.document_type, expiry),
                );
            }
        }
    }

    if let Some(expiry) = driver.insurance_expiry {
        if expiry <= today {
            check.missing("seguro", "Seguro vencido".to_string());
        } else if expiry <= warn_until {
            check.expiring("seguro", format!("Seguro vence el {}", expiry));
        }
    }

    if driver.state_code.as_deref() == Some(CDMX) {
        if driver.semovi_constancia_expiry.is_some_and(|d| d <= today) {
            check.missing("constanciaSemovi", "Constancia SEMOVI vencida".to_string());
        }
        if driver.semovi_vehicular_expiry.is_some_and(|d| d <= today) {
            check.missing("constanciaVehicular", "Constancia Vehicular vencida".to_string());
        }
    }

    check
}
