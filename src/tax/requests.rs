//! Request DTOs for tax endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::models::TransactionType;

/// Request to calculate (and record) retention on a driver payout
#[derive(Debug, Deserialize)]
pub struct TaxRetentionRequest {
    #[serde(default)]
    pub driver_id: Option<Uuid>,
    #[serde(default)]
    pub gross_amount: Option<Decimal>,
    #[serde(default)]
    pub ride_id: Option<Uuid>,
    #[serde(default)]
    pub delivery_id: Option<Uuid>,
    #[serde(default)]
    pub transaction_type: TransactionType,
}
