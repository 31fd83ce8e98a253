//! Exchange rate storage.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::cache::AppCache;
use crate::error::AppError;

/// Storage for fetched exchange rates, newest first per pair
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Most recently fetched rate for `base -> quote`
    async fn latest_rate(&self, base: &str, quote: &str) -> Result<Option<Decimal>, AppError>;

    async fn record_rate(
        &self,
        base: &str,
        quote: &str,
        rate: Decimal,
        source: &str,
    ) -> Result<(), AppError>;

    /// Keep only the newest `keep` rows for the pair; returns rows deleted
    async fn prune_pair(&self, base: &str, quote: &str, keep: i64) -> Result<u64, AppError>;
}

/// Postgres-backed rate store with a moka cache in front of lookups
#[derive(Clone)]
pub struct PgRateStore {
    pool: PgPool,
    cache: AppCache,
}

impl PgRateStore {
    pub fn new(pool: PgPool, cache: AppCache) -> Self {
        Self { pool, cache }
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn latest_rate(&self, base: &str, quote: &str) -> Result<Option<Decimal>, AppError> {
        let key = AppCache::fx_key(base, quote);
        if let Some(rate) = self.cache.fx_rates.get(&key).await {
            tracing::debug!("Cache HIT for FX rate: {}", key);
            return Ok(Some(rate));
        }

        let rate: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT rate::numeric
            FROM fx_rates
            WHERE base_currency = $1
              AND quote_currency = $2
            ORDER BY fetched_at DESC
            LIMIT 1
            "#,
        )
        .bind(base)
        .bind(quote)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(rate) = rate {
            self.cache.fx_rates.insert(key, rate).await;
        }

        Ok(rate)
    }

    async fn record_rate(
        &self,
        base: &str,
        quote: &str,
        rate: Decimal,
        source: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO fx_rates (base_currency, quote_currency, rate, source, fetched_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(base)
        .bind(quote)
        .bind(rate)
        .bind(source)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.cache.fx_rates.invalidate(&AppCache::fx_key(base, quote)).await;

        Ok(())
    }

    async fn prune_pair(&self, base: &str, quote: &str, keep: i64) -> Result<u64, AppError> {
        if keep <= 0 {
            return Ok(0);
        }

        // The subquery is NULL while the pair has fewer than `keep` rows
        let result = sqlx::query(
            r#"
            DELETE FROM fx_rates
            WHERE base_currency = $1
              AND quote_currency = $2
              AND fetched_at < (
                  SELECT fetched_at
                  FROM fx_rates
                  WHERE base_currency = $1
                    AND quote_currency = $2
                  ORDER BY fetched_at DESC
                  OFFSET $3
                  LIMIT 1
              )
            "#,
        )
        .bind(base)
        .bind(quote)
        .bind(keep - 1)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
