//! Tax retention service.

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;

use super::calculators::{calculate_retention, currency_for_country, no_retention, Retention, RetentionRates};
use super::queries::{self, Period, RetentionSource};
use super::requests::TaxRetentionRequest;

/// A retention request with required fields checked
#[derive(Debug, Clone)]
pub struct ValidatedRetention {
    pub driver_id: Uuid,
    pub gross_amount: Decimal,
    pub source: RetentionSource,
}

impl TaxRetentionRequest {
    pub fn validate(self) -> Result<ValidatedRetention, AppError> {
        let driver_id = self
            .driver_id
            .ok_or_else(|| AppError::BadRequest("driver_id is required".to_string()))?;

        let gross_amount = match self.gross_amount {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => {
                return Err(AppError::BadRequest(
                    "gross_amount must be greater than 0".to_string(),
                ))
            }
        };

        Ok(ValidatedRetention {
            driver_id,
            gross_amount,
            source: RetentionSource {
                ride_id: self.ride_id,
                delivery_id: self.delivery_id,
                transaction_type: self.transaction_type,
            },
        })
    }
}

pub fn period_of(now_local: NaiveDateTime) -> Period {
    Period {
        year: now_local.year(),
        month: now_local.month() as i32,
    }
}

/// Calculate retention for a payout and, for Mexican drivers, record it.
///
/// The retention row, the monthly summary and the trip stamp are written in
/// one transaction.
pub async fn calculate_tax_retention(
    pool: &PgPool,
    request: TaxRetentionRequest,
    now_local: NaiveDateTime,
) -> Result<Retention, AppError> {
    let request = request.validate()?;

    let driver = queries::find_driver(pool, request.driver_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;

    if !driver.is_mexican() {
        let currency = currency_for_country(driver.country_code.as_deref());
        return Ok(no_retention(request.gross_amount, currency));
    }

    let has_rfc = driver.has_validated_rfc();
    let country_rates = queries::find_country_rates(pool, "MX").await?;
    let rates = RetentionRates::resolve(country_rates.as_ref(), has_rfc);
    let retention = calculate_retention(request.gross_amount, has_rfc, rates);

    let period = period_of(now_local);
    let mut tx = pool.begin().await?;
    queries::insert_retention(&mut tx, driver.id, &request.source, &retention, period).await?;
    queries::accumulate_monthly_summary(&mut tx, driver.id, &retention, period).await?;
    queries::mark_trip_retained(
        &mut tx,
        &request.source,
        retention.isr_amount,
        retention.iva_amount,
    )
    .await?;
    tx.commit().await?;

    info!(
        "Recorded retention for driver {}: gross {} isr {} iva {}",
        driver.id, retention.gross_amount, retention.isr_amount, retention.iva_amount
    );

    Ok(retention)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::models::TransactionType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn request(driver_id: Option<Uuid>, gross: Option<Decimal>) -> TaxRetentionRequest {
        TaxRetentionRequest {
            driver_id,
            gross_amount: gross,
            ride_id: None,
            delivery_id: None,
            transaction_type: TransactionType::Delivery,
        }
    }

    #[test]
    fn test_validate_requires_driver() {
        let err = request(None, Some(dec!(100))).validate().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_validate_rejects_non_positive_gross() {
        let id = Some(Uuid::new_v4());
        assert!(request(id, None).validate().is_err());
        assert!(request(id, Some(dec!(0))).validate().is_err());
        assert!(request(id, Some(dec!(-5))).validate().is_err());
    }

    #[test]
    fn test_validate_keeps_source() {
        let id = Uuid::new_v4();
        let v = request(Some(id), Some(dec!(99.5))).validate().unwrap();
        assert_eq!(v.driver_id, id);
        assert_eq!(v.gross_amount, dec!(99.5));
        assert_eq!(v.source.transaction_type, TransactionType::Delivery);
    }

    #[test]
    fn test_period_uses_local_date() {
        let t = NaiveDate::from_ymd_opt(2026, 12, 31)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        assert_eq!(period_of(t), Period { year: 2026, month: 12 });
    }
}
