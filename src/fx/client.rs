//! exchangerate-api.com client.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

const V6_API_BASE: &str = "https://v6.exchangerate-api.com/v6";

#[derive(Debug, thiserror::Error)]
pub enum FxFetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("no rates in response for {0}")]
    MissingRates(String),
}

/// Anything that can produce the latest rates for a base currency
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Label stored with every fetched rate
    fn source_label(&self) -> &'static str;

    /// Map of quote currency -> rate for one base currency
    async fn fetch_latest(&self, base: &str) -> Result<HashMap<String, Decimal>, FxFetchError>;
}

/// v4 responses carry `rates`, v6 responses `conversion_rates`
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: Option<HashMap<String, Decimal>>,
    conversion_rates: Option<HashMap<String, Decimal>>,
}

/// HTTP client for exchangerate-api (v4 keyless or v6 with key)
#[derive(Debug, Clone)]
pub struct FxApiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl FxApiClient {
    pub fn new(http: reqwest::Client, api_url: String, api_key: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn latest_url(&self, base: &str) -> String {
        match &self.api_key {
            Some(key) => format!("{}/{}/latest/{}", V6_API_BASE, key, base),
            None => format!("{}/{}", self.api_url, base),
        }
    }
}

#[async_trait]
impl RateSource for FxApiClient {
    fn source_label(&self) -> &'static str {
        if self.api_key.is_some() {
            "exchangerate-api-v6"
        } else {
            "exchangerate-api-v4"
        }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_latest(&self, base: &str) -> Result<HashMap<String, Decimal>, FxFetchError> {
        let res = self.http.get(self.latest_url(base)).send().await?;

        if !res.status().is_success() {
            return Err(FxFetchError::Status(res.status().as_u16()));
        }

        let data: LatestRatesResponse = res.json().await?;

        data.rates
            .or(data.conversion_rates)
            .ok_or_else(|| FxFetchError::MissingRates(base.to_string()))
    }
}
