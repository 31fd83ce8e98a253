//! Database queries for tax retention.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppError;

use super::calculators::Retention;
use super::models::{CountryTaxRates, DriverTaxProfile, MonthlySummary, TransactionType};

/// Fiscal period a retention is booked into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: i32,
}

pub async fn find_driver(pool: &PgPool, driver_id: Uuid) -> Result<Option<DriverTaxProfile>, AppError> {
    let driver = sqlx::query_as::<_, DriverTaxProfile>(
        r#"
        SELECT id, country_code, rfc, rfc_validated
        FROM drivers
        WHERE id = $1
        "#,
    )
    .bind(driver_id)
    .fetch_optional(pool)
    .await?;

    Ok(driver)
}

pub async fn find_country_rates(
    pool: &PgPool,
    country_code: &str,
) -> Result<Option<CountryTaxRates>, AppError> {
    let rates = sqlx::query_as::<_, CountryTaxRates>(
        r#"
        SELECT
            isr_rate_with_rfc::numeric AS isr_rate_with_rfc,
            isr_rate_without_rfc::numeric AS isr_rate_without_rfc,
            iva_retention_rate::numeric AS iva_retention_rate
        FROM countries
        WHERE code = $1
        "#,
    )
    .bind(country_code)
    .fetch_optional(pool)
    .await?;

    Ok(rates)
}

/// Link to the trip the payout belongs to
#[derive(Debug, Clone, Copy, Default)]
pub struct RetentionSource {
    pub ride_id: Option<Uuid>,
    pub delivery_id: Option<Uuid>,
    pub transaction_type: TransactionType,
}

pub async fn insert_retention(
    tx: &mut Transaction<'_, Postgres>,
    driver_id: Uuid,
    source: &RetentionSource,
    retention: &Retention,
    period: Period,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO tax_retentions (
            driver_id, ride_id, delivery_id, transaction_type,
            gross_amount, has_rfc, isr_rate, isr_amount,
            iva_rate, iva_amount, iva_driver_owes, net_amount,
            period_year, period_month, currency
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(driver_id)
    .bind(source.ride_id)
    .bind(source.delivery_id)
    .bind(source.transaction_type.as_str())
    .bind(retention.gross_amount)
    .bind(retention.has_rfc)
    .bind(retention.isr_rate)
    .bind(retention.isr_amount)
    .bind(retention.iva_rate)
    .bind(retention.iva_amount)
    .bind(retention.iva_driver_owes)
    .bind(retention.net_amount)
    .bind(period.year)
    .bind(period.month)
    .bind(&retention.currency)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Advisory lock key for one driver's fiscal period
pub fn summary_lock_key(driver_id: Uuid, period: Period) -> String {
    format!("tax_monthly_summary:{}:{}:{:02}", driver_id, period.year, period.month)
}

/// Serialize summary writers for a driver and period until the transaction ends.
///
/// `FOR UPDATE` cannot lock a row that does not exist yet.
async fn lock_summary(
    tx: &mut Transaction<'_, Postgres>,
    driver_id: Uuid,
    period: Period,
) -> Result<(), AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(summary_lock_key(driver_id, period))
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn fetch_summary_for_update(
    tx: &mut Transaction<'_, Postgres>,
    driver_id: Uuid,
    period: Period,
) -> Result<Option<MonthlySummary>, AppError> {
    let summary = sqlx::query_as::<_, MonthlySummary>(
        r#"
        SELECT
            id,
            total_gross::numeric AS total_gross,
            total_isr_retained::numeric AS total_isr_retained,
            total_iva_retained::numeric AS total_iva_retained,
            total_iva_driver_owes::numeric AS total_iva_driver_owes,
            total_net::numeric AS total_net,
            transaction_count
        FROM tax_monthly_summary
        WHERE driver_id = $1
          AND period_year = $2
          AND period_month = $3
        FOR UPDATE
        "#,
    )
    .bind(driver_id)
    .bind(period.year)
    .bind(period.month)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(summary)
}

/// Add a retention to the driver's running monthly totals
pub async fn accumulate_monthly_summary(
    tx: &mut Transaction<'_, Postgres>,
    driver_id: Uuid,
    retention: &Retention,
    period: Period,
) -> Result<(), AppError> {
    lock_summary(tx, driver_id, period).await?;

    match fetch_summary_for_update(tx, driver_id, period).await? {
        Some(existing) => {
            sqlx::query(
                r#"
                UPDATE tax_monthly_summary
                SET total_gross = $2,
                    total_isr_retained = $3,
                    total_iva_retained = $4,
                    total_iva_driver_owes = $5,
                    total_net = $6,
                    transaction_count = $7,
                    had_rfc = $8,
                    updated_at = now()
                WHERE id = $1
                "#,
            )
            .bind(existing.id)
            .bind(existing.total_gross + retention.gross_amount)
            .bind(existing.total_isr_retained + retention.isr_amount)
            .bind(existing.total_iva_retained + retention.iva_amount)
            .bind(existing.total_iva_driver_owes + retention.iva_driver_owes)
            .bind(existing.total_net + retention.net_amount)
            .bind(existing.transaction_count + 1)
            .bind(retention.has_rfc)
            .execute(&mut **tx)
            .await?;
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO tax_monthly_summary (
                    driver_id, period_year, period_month,
                    total_gross, total_isr_retained, total_iva_retained,
                    total_iva_driver_owes, total_net, transaction_count, had_rfc
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, $9)
                "#,
            )
            .bind(driver_id)
            .bind(period.year)
            .bind(period.month)
            .bind(retention.gross_amount)
            .bind(retention.isr_amount)
            .bind(retention.iva_amount)
            .bind(retention.iva_driver_owes)
            .bind(retention.net_amount)
            .bind(retention.has_rfc)
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(())
}

/// Stamp the withheld amounts on the ride and/or delivery
pub async fn mark_trip_retained(
    tx: &mut Transaction<'_, Postgres>,
    source: &RetentionSource,
    isr_amount: Decimal,
    iva_amount: Decimal,
) -> Result<(), AppError> {
    if let Some(ride_id) = source.ride_id {
        sqlx::query("UPDATE rides SET isr_retained = $2, iva_retained = $3 WHERE id = $1")
            .bind(ride_id)
            .bind(isr_amount)
            .bind(iva_amount)
            .execute(&mut **tx)
            .await?;
    }

    if let Some(delivery_id) = source.delivery_id {
        sqlx::query(
            "UPDATE package_deliveries SET isr_retained = $2, iva_retained = $3 WHERE id = $1",
        )
        .bind(delivery_id)
        .bind(isr_amount)
        .bind(iva_amount)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
