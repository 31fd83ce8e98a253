use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use toro_pricing::cache::AppCache;
use toro_pricing::cfdi::{FacturamaClient, PacRegistry, SandboxPac};
use toro_pricing::config::AppConfig;
use toro_pricing::fx::{self, FxApiClient, PgRateStore, RateSource, RateStore};
use toro_pricing::pricing::{FixedSurge, PgZonePricingResolver};
use toro_pricing::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("toro_pricing=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let cache = AppCache::new();
    let rate_store: Arc<dyn RateStore> = Arc::new(PgRateStore::new(db.clone(), cache.clone()));
    let rate_source: Arc<dyn RateSource> = Arc::new(FxApiClient::new(
        http.clone(),
        config.fx_api_url.clone(),
        config.fx_api_key.clone(),
    ));

    if config.fx_refresh_interval_mins > 0 {
        let every = Duration::from_secs(config.fx_refresh_interval_mins * 60);
        info!("Refreshing FX rates every {} min", config.fx_refresh_interval_mins);
        tokio::spawn(fx::start_fx_refresher(
            rate_source.clone(),
            rate_store.clone(),
            every,
        ));
    }

    let pacs = PacRegistry::new(
        Arc::new(FacturamaClient::new(http, config.facturama.clone())),
        Arc::new(SandboxPac),
    );

    let addr = config.bind_addr();
    let state = AppState {
        db: db.clone(),
        zone_resolver: Arc::new(PgZonePricingResolver::new(db, cache.clone())),
        cache,
        config: Arc::new(config),
        rate_store,
        rate_source,
        surge: Arc::new(FixedSurge::default()),
        pacs,
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("toro-pricing listening on {}", addr);

    axum::serve(listener, routes::app(state))
        .await
        .context("server error")?;

    Ok(())
}
