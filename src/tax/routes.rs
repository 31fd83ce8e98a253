//! Tax route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;

use crate::error::Result;
use crate::responses::{ok, ApiResponse};
use crate::AppState;

use super::requests::TaxRetentionRequest;
use super::responses::TaxRetentionResponse;
use super::services;

pub fn router() -> Router<AppState> {
    Router::new().route("/tax/retention", post(retention))
}

async fn retention(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TaxRetentionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TaxRetentionResponse>>> {
    let Json(request) = payload?;
    let now_local = Utc::now()
        .with_timezone(&state.config.local_utc_offset)
        .naive_local();

    let retention = services::calculate_tax_retention(&state.db, request, now_local).await?;

    Ok(ok(TaxRetentionResponse::from(retention)))
}
