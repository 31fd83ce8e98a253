//! FX refresh: pull latest rates from the provider, store them, prune history.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

use super::client::RateSource;
use super::responses::{FxRefreshResponse, UpdatedRate};
use super::store::RateStore;

/// Currencies we fetch rates for
pub const BASE_CURRENCIES: [&str; 2] = ["MXN", "USD"];

/// Currencies we store rates into
pub const QUOTE_CURRENCIES: [&str; 3] = ["MXN", "USD", "EUR"];

/// Rows kept per currency pair after pruning
pub const RATES_KEPT_PER_PAIR: i64 = 100;

/// Fetch and store the latest rates for every configured pair.
///
/// A failed fetch for one base currency, or a failed insert for one pair, is
/// logged and skipped; only stored rates are reported back.
pub async fn refresh_rates(source: &dyn RateSource, store: &dyn RateStore) -> FxRefreshResponse {
    let label = source.source_label();
    let mut updated = Vec::new();

    for base in BASE_CURRENCIES {
        let rates = match source.fetch_latest(base).await {
            Ok(rates) => rates,
            Err(e) => {
                error!("Failed to fetch rates for {}: {}", base, e);
                continue;
            }
        };

        for quote in QUOTE_CURRENCIES {
            if quote == base {
                continue;
            }

            let rate = match rates.get(quote) {
                Some(rate) if !rate.is_zero() => *rate,
                _ => continue,
            };

            match store.record_rate(base, quote, rate, label).await {
                Ok(()) => updated.push(UpdatedRate {
                    base: base.to_string(),
                    quote: quote.to_string(),
                    rate,
                }),
                Err(e) => error!("Error inserting rate {}/{}: {}", base, quote, e),
            }
        }
    }

    prune_history(store).await;

    info!("FX refresh stored {} rates from {}", updated.len(), label);

    FxRefreshResponse {
        rates_updated: updated.len(),
        rates: updated,
        source: label.to_string(),
        timestamp: Utc::now(),
    }
}

async fn prune_history(store: &dyn RateStore) {
    for base in BASE_CURRENCIES {
        for quote in QUOTE_CURRENCIES {
            if quote == base {
                continue;
            }

            match store.prune_pair(base, quote, RATES_KEPT_PER_PAIR).await {
                Ok(0) => {}
                Ok(deleted) => info!("Pruned {} old {}/{} rates", deleted, base, quote),
                Err(e) => warn!("Failed to prune {}/{} rates: {}", base, quote, e),
            }
        }
    }
}

/// Periodically refresh FX rates in the background
pub async fn start_fx_refresher(
    source: Arc<dyn RateSource>,
    store: Arc<dyn RateStore>,
    every: Duration,
) {
    let mut interval = interval(every);
    loop {
        interval.tick().await;
        refresh_rates(source.as_ref(), store.as_ref()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::client::FxFetchError;
    use crate::fx::store::memory::MemoryRateStore;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    /// Serves fixed rates; bases not in the map fail
    struct FixedSource(HashMap<&'static str, HashMap<String, Decimal>>);

    #[async_trait]
    impl RateSource for FixedSource {
        fn source_label(&self) -> &'static str {
            "exchangerate-api-v4"
        }

        async fn fetch_latest(&self, base: &str) -> Result<HashMap<String, Decimal>, FxFetchError> {
            self.0
                .get(base)
                .cloned()
                .ok_or(FxFetchError::Status(503))
        }
    }

    fn rates(pairs: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[tokio::test]
    async fn test_refresh_stores_all_pairs() {
        let source = FixedSource(HashMap::from([
            ("MXN", rates(&[("MXN", dec!(1)), ("USD", dec!(0.055)), ("EUR", dec!(0.051))])),
            ("USD", rates(&[("USD", dec!(1)), ("MXN", dec!(18.2)), ("EUR", dec!(0.92))])),
        ]));
        let store = MemoryRateStore::default();

        let response = refresh_rates(&source, &store).await;

        assert_eq!(response.rates_updated, 4);
        assert_eq!(response.source, "exchangerate-api-v4");
        assert_eq!(store.latest_rate("MXN", "EUR").await.unwrap(), Some(dec!(0.051)));
        assert_eq!(store.latest_rate("USD", "MXN").await.unwrap(), Some(dec!(18.2)));
        assert_eq!(store.latest_rate("MXN", "MXN").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_skips_failed_base_and_missing_quotes() {
        let source = FixedSource(HashMap::from([(
            "MXN",
            rates(&[("USD", dec!(0.055)), ("EUR", dec!(0))]),
        )]));
        let store = MemoryRateStore::default();

        let response = refresh_rates(&source, &store).await;

        assert_eq!(response.rates_updated, 1);
        assert_eq!(response.rates[0].quote, "USD");
        assert_eq!(store.latest_rate("MXN", "EUR").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_prunes_history() {
        let store = MemoryRateStore::default();
        for _ in 0..RATES_KEPT_PER_PAIR + 5 {
            store.record_rate("MXN", "USD", dec!(0.05), "old").await.unwrap();
        }
        let source = FixedSource(HashMap::from([("MXN", rates(&[("USD", dec!(0.056))]))]));

        refresh_rates(&source, &store).await;

        let rows = store.rows.lock().await;
        assert_eq!(rows.len() as i64, RATES_KEPT_PER_PAIR);
        assert_eq!(rows.last().unwrap().2, dec!(0.056));
    }
}
