//! FX route handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::responses::{ok, ApiResponse};
use crate::AppState;

use super::responses::{FxRefreshResponse, LatestRateResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fx/refresh", post(refresh))
        .route("/fx/rates/:base/:quote", get(latest))
}

/// Refresh rates from the provider (called by cron)
async fn refresh(State(state): State<AppState>) -> Json<ApiResponse<FxRefreshResponse>> {
    let response =
        services::refresh_rates(state.rate_source.as_ref(), state.rate_store.as_ref()).await;
    state.cache.invalidate_fx_rates();
    ok(response)
}

/// Latest stored rate for a pair
async fn latest(
    State(state): State<AppState>,
    Path((base, quote)): Path<(String, String)>,
) -> Result<Json<ApiResponse<LatestRateResponse>>> {
    let base = base.to_uppercase();
    let quote = quote.to_uppercase();

    let rate = state
        .rate_store
        .latest_rate(&base, &quote)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No rate stored for {}/{}", base, quote)))?;

    Ok(ok(LatestRateResponse { base, quote, rate }))
}
