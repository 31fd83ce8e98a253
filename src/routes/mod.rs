//! HTTP surface: every module router plus health and cache stats.

use axum::{
    extract::State,
    http::{header, HeaderName, Method},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache::CacheStats;
use crate::responses::{ok, ApiResponse};
use crate::{cfdi, drivers, fx, pricing, tax, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn cache_stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStats>> {
    ok(state.cache.stats())
}

/// Browser clients call from any origin with a bearer token and API key
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cache/stats", get(cache_stats))
        .merge(pricing::router())
        .merge(fx::router())
        .merge(tax::router())
        .merge(drivers::router())
        .merge(cfdi::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AppCache;
    use crate::cfdi::{FacturamaClient, PacRegistry, SandboxPac};
    use crate::config::AppConfig;
    use crate::error::AppError;
    use crate::fx::client::FxFetchError;
    use crate::fx::store::memory::MemoryRateStore;
    use crate::fx::RateSource;
    use crate::pricing::calculators::Coordinates;
    use crate::pricing::{FixedSurge, ZonePricing, ZonePricingResolver};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct NoZone;

    #[async_trait]
    impl ZonePricingResolver for NoZone {
        async fn resolve(
            &self,
            _pickup: Coordinates,
            _service_type: &str,
            _vehicle_type: &str,
        ) -> Result<Option<ZonePricing>, AppError> {
            Ok(None)
        }
    }

    struct NoSource;

    #[async_trait]
    impl RateSource for NoSource {
        fn source_label(&self) -> &'static str {
            "none"
        }

        async fn fetch_latest(&self, base: &str) -> Result<HashMap<String, Decimal>, FxFetchError> {
            Err(FxFetchError::MissingRates(base.to_string()))
        }
    }

    fn test_app() -> Router {
        let config = AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/toro_test".to_string()),
            _ => None,
        })
        .unwrap();
        let db = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        let pacs = PacRegistry::new(
            Arc::new(FacturamaClient::new(reqwest::Client::new(), config.facturama.clone())),
            Arc::new(SandboxPac),
        );

        app(AppState {
            db,
            cache: AppCache::new(),
            config: Arc::new(config),
            zone_resolver: Arc::new(NoZone),
            rate_store: Arc::new(MemoryRateStore::with_rate("MXN", "USD", dec!(0.055))),
            rate_source: Arc::new(NoSource),
            surge: Arc::new(FixedSurge::default()),
            pacs,
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(test_app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_quote_falls_back_to_default_zone() {
        let body = r#"{
            "pickup_lat": 19.4326, "pickup_lng": -99.1332,
            "distance_km": 10, "duration_min": 15,
            "display_currency": "usd",
            "as_of": "2026-10-14T18:00:00Z"
        }"#;
        let (status, body) = send(test_app(), post_json("/pricing/quote", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["zone_id"], 0);
        assert_eq!(body["data"]["currency"], "MXN");
        assert_eq!(body["data"]["display_currency"], "USD");
        assert!(body["data"]["total"].as_f64().unwrap() > 0.0);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_json_envelope() {
        for uri in ["/pricing/quote", "/tax/retention", "/drivers/validate", "/cfdi/invoices"] {
            let (status, body) = send(test_app(), post_json(uri, r#"{"driver_id": "#)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["success"], false, "{}", uri);
            assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_quote_out_of_range_metrics() {
        let body = r#"{
            "pickup_lat": 19.4326, "pickup_lng": -99.1332,
            "distance_km": "30000000000000000000000000000", "duration_min": 15
        }"#;
        let (status, body) = send(test_app(), post_json("/pricing/quote", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "trip metrics out of range");
    }

    #[tokio::test]
    async fn test_quote_missing_fields() {
        let (status, body) =
            send(test_app(), post_json("/pricing/quote", r#"{"pickup_lat": 19.4}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "pickup_lat, pickup_lng, distance_km, and duration_min are required"
        );
    }

    #[tokio::test]
    async fn test_fx_latest_rate() {
        let (status, body) = send(test_app(), get("/fx/rates/mxn/usd")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["base"], "MXN");
        assert_eq!(body["data"]["rate"], 0.055);

        let (status, body) = send(test_app(), get("/fx/rates/MXN/EUR")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_validation_errors_before_database() {
        let (status, _) = send(
            test_app(),
            post_json("/tax/retention", r#"{"gross_amount": 100}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            test_app(),
            post_json("/drivers/validate", r#"{"validation_type": "rfc"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "driver_id is required");

        let (status, body) = send(
            test_app(),
            post_json("/cfdi/invoices", r#"{"receptor_rfc": "GODE561231GR8"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let (status, body) = send(test_app(), get("/cache/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["zone_pricing_size"], 0);
    }
}
