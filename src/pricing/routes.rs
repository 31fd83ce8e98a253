//! Pricing route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;

use crate::error::Result;
use crate::responses::{ok, ApiResponse};
use crate::AppState;

use super::requests::PricingQuoteRequest;
use super::responses::PricingQuoteResponse;
use super::services;

pub fn router() -> Router<AppState> {
    Router::new().route("/pricing/quote", post(quote))
}

/// Quote a ride or delivery in the pickup zone's local time
async fn quote(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PricingQuoteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PricingQuoteResponse>>> {
    let Json(request) = payload?;
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    let now_local = as_of
        .with_timezone(&state.config.local_utc_offset)
        .naive_local();
    let trip = request.into_trip_quote()?;

    let priced = services::quote_trip(
        state.zone_resolver.as_ref(),
        state.rate_store.as_ref(),
        state.surge.as_ref(),
        &trip,
        now_local,
    )
    .await?;

    tracing::debug!(
        "Quoted zone {} subtotal {} total {}",
        priced.zone.zone_id,
        priced.quote.subtotal,
        priced.quote.total
    );

    Ok(ok(PricingQuoteResponse::from(priced)))
}
