//! Request DTOs for driver validation.

use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationType {
    Rfc,
    Documents,
    #[default]
    All,
}

impl ValidationType {
    pub fn checks_rfc(self) -> bool {
        matches!(self, ValidationType::Rfc | ValidationType::All)
    }

    pub fn checks_documents(self) -> bool {
        matches!(self, ValidationType::Documents | ValidationType::All)
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateDriverRequest {
    #[serde(default)]
    pub driver_id: Option<Uuid>,
    #[serde(default)]
    pub validation_type: ValidationType,
    #[serde(default)]
    pub rfc: Option<String>,
}
